//! Zhang-Suen skeletonisation of binary masks.

use image::{GrayImage, Luma};

/// Thins every foreground (non-zero) region of `mask` to a one pixel wide
/// skeleton. Pixels outside the image count as background.
pub(crate) fn zhang_suen(mask: &GrayImage) -> GrayImage {
    let (w, h) = mask.dimensions();
    let (wi, hi) = (w as i64, h as i64);
    let mut on: Vec<bool> = mask.pixels().map(|p| p.0[0] > 0).collect();

    let at = |on: &[bool], x: i64, y: i64| -> bool {
        x >= 0 && y >= 0 && x < wi && y < hi && on[(y * wi + x) as usize]
    };

    let mut removed = Vec::new();
    loop {
        let mut changed = false;
        for pass in 0..2 {
            removed.clear();
            for y in 0..hi {
                for x in 0..wi {
                    if !on[(y * wi + x) as usize] {
                        continue;
                    }
                    // P2..P9 clockwise from north.
                    let n = [
                        at(&on, x, y - 1),
                        at(&on, x + 1, y - 1),
                        at(&on, x + 1, y),
                        at(&on, x + 1, y + 1),
                        at(&on, x, y + 1),
                        at(&on, x - 1, y + 1),
                        at(&on, x - 1, y),
                        at(&on, x - 1, y - 1),
                    ];
                    let b = n.iter().filter(|&&v| v).count();
                    if !(2..=6).contains(&b) {
                        continue;
                    }
                    let a = (0..8).filter(|&i| !n[i] && n[(i + 1) % 8]).count();
                    if a != 1 {
                        continue;
                    }
                    let (p2, p4, p6, p8) = (n[0], n[2], n[4], n[6]);
                    let keep = if pass == 0 {
                        p2 && p4 && p6 || p4 && p6 && p8
                    } else {
                        p2 && p4 && p8 || p2 && p6 && p8
                    };
                    if !keep {
                        removed.push((y * wi + x) as usize);
                    }
                }
            }
            if !removed.is_empty() {
                changed = true;
                for &i in &removed {
                    on[i] = false;
                }
            }
        }
        if !changed {
            break;
        }
    }

    GrayImage::from_fn(w, h, |x, y| {
        Luma([if on[(y * w + x) as usize] { 255 } else { 0 }])
    })
}
