fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use insdraw_gesture::GesturePlan;
    use insdraw_protocol::{Canvas, Primitive, join_batch, shell_line};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn read_fixture(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        serde_json::from_str(&read_fixture(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  fixture: {fixture}\n  rust:    {reserialized}"
        );
        parsed
    }

    fn fixture_commands() -> Vec<Primitive> {
        read_fixture("commands.txt")
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.parse().unwrap_or_else(|e| panic!("bad command {l:?}: {e}")))
            .collect()
    }

    // --- JSON ---

    #[test]
    fn fixture_primitive_tap() {
        let tap: Primitive = roundtrip_test("primitive_tap.json");
        assert!(tap.is_tap());
    }

    #[test]
    fn fixture_primitive_swipe() {
        let swipe: Primitive = roundtrip_test("primitive_swipe.json");
        assert_eq!(swipe.duration_ms(), 18);
    }

    #[test]
    fn fixture_gesture_plan() {
        let plan: GesturePlan = roundtrip_test("gesture_plan.json");
        assert_eq!(plan.len(), 4);
        assert_eq!(plan.taps + plan.swipes, plan.len());
    }

    // --- Shell text ---

    #[test]
    fn commands_reencode_identically() {
        let text = read_fixture("commands.txt");
        let encoded: Vec<String> = fixture_commands().iter().map(shell_line).collect();
        let expected: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(encoded, expected);
    }

    #[test]
    fn commands_match_plan_fixture() {
        let plan: GesturePlan = serde_json::from_value(load_fixture("gesture_plan.json")).unwrap();
        assert_eq!(fixture_commands(), plan.primitives);
    }

    #[test]
    fn batch_joins_commands() {
        let batch = read_fixture("batch.txt");
        assert_eq!(join_batch(&fixture_commands()), batch.trim_end());
    }

    // --- adb output ---

    #[test]
    fn adb_devices_output() {
        let serials = insdraw_adb::parse::parse_devices(&read_fixture("adb_devices.txt"));
        assert_eq!(serials, vec!["emulator-5554", "192.168.1.20:5555"]);
    }

    #[test]
    fn wm_size_output() {
        let canvas = insdraw_adb::parse::parse_screen_size(&read_fixture("wm_size.txt"));
        assert_eq!(canvas, Some(Canvas::new(1080, 2400)));
    }
}
