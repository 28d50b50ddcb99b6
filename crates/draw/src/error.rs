//! Draw-run error types.

use insdraw_imaging::ImagingError;

/// Exit code for a run that found nothing to draw.
pub const NOTHING_TO_DRAW_CODE: i32 = 3;

/// Exit code for a run aborted because the image could not be used.
pub const IMAGE_ERROR_CODE: i32 = 2;

/// Exit code for a run aborted because the device could not be queried.
pub const DEVICE_ERROR_CODE: i32 = 4;

/// Exit code for a failed delivery whose device status would be mistaken
/// for one of the codes above.
pub const TRANSPORT_ERROR_CODE: i32 = 1;

/// Codes a run reports for itself; a device shell status never uses them.
pub(crate) const RESERVED_CODES: [i32; 3] = [IMAGE_ERROR_CODE, NOTHING_TO_DRAW_CODE, DEVICE_ERROR_CODE];

/// Errors that abort a draw run before anything is written to the device.
#[derive(Debug, thiserror::Error)]
pub enum DrawError {
    #[error(transparent)]
    ImageLoad(#[from] ImagingError),

    #[error("nothing to draw: the image produced no contours")]
    NoDrawableContent,

    #[error("device {serial} unavailable: screen size could not be read")]
    DeviceUnavailable { serial: String },

    #[error("no device connected")]
    NoDevice,

    #[error("pipeline task failed: {0}")]
    Task(String),
}

impl DrawError {
    /// Machine-checkable code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ImageLoad(_) => IMAGE_ERROR_CODE,
            Self::NoDrawableContent => NOTHING_TO_DRAW_CODE,
            Self::DeviceUnavailable { .. } | Self::NoDevice => DEVICE_ERROR_CODE,
            Self::Task(_) => TRANSPORT_ERROR_CODE,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn image_error_is_not_repeated_as_its_own_source() {
        let err = DrawError::from(ImagingError::ImageLoad {
            path: "cat.png".into(),
            reason: "unsupported format".into(),
        });
        assert_eq!(err.exit_code(), IMAGE_ERROR_CODE);
        assert!(err.to_string().contains("cat.png"));
        // `transparent` forwards the inner error's source instead of
        // wrapping the inner error itself.
        assert!(err.source().is_none());
    }

    #[test]
    fn codes_are_distinct() {
        assert!(!RESERVED_CODES.contains(&TRANSPORT_ERROR_CODE));
        assert_eq!(DrawError::NoDevice.exit_code(), DEVICE_ERROR_CODE);
        assert_eq!(
            DrawError::DeviceUnavailable { serial: "abc".into() }.exit_code(),
            DEVICE_ERROR_CODE
        );
        assert_eq!(DrawError::NoDrawableContent.exit_code(), NOTHING_TO_DRAW_CODE);
    }
}
