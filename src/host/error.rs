//=========================================================================
// Host Errors
//=========================================================================
//
// Failures on the plugin side of the loader boundary.
//
// Only `Main` surfaces these to the host, as a `false` return. Host calls
// themselves are never checked for failure.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::NulError;

//=== HostError ===========================================================

/// Errors raised while talking to the host.
#[derive(Debug)]
pub enum HostError {
    /// `Main` received a null SDK table.
    NullSdk,

    /// `Main` received a null plugin handle.
    NullHandle,

    /// The SDK table lacks an interface the plugin depends on.
    MissingInterface(&'static str),

    /// `Main` received a reason code it does not know.
    UnknownReason(u32),

    /// A name could not be handed to the host as a C string.
    InvalidName(NulError),

    /// Another logger already owns the `log` facade in this process.
    LoggerInstall(log::SetLoggerError),
}

//--- Trait Implementations -----------------------------------------------

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NullSdk => write!(f, "Host passed a null SDK table"),
            Self::NullHandle => write!(f, "Host passed a null plugin handle"),
            Self::MissingInterface(name) => write!(f, "SDK table has no {} interface", name),
            Self::UnknownReason(code) => write!(f, "Unknown Main reason code: {}", code),
            Self::InvalidName(e) => write!(f, "Name is not a valid C string: {}", e),
            Self::LoggerInstall(e) => write!(f, "Host logger not installed: {}", e),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidName(e) => Some(e),
            Self::LoggerInstall(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NulError> for HostError {
    fn from(e: NulError) -> Self {
        Self::InvalidName(e)
    }
}

impl From<log::SetLoggerError> for HostError {
    fn from(e: log::SetLoggerError) -> Self {
        Self::LoggerInstall(e)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::ffi::CString;

    #[test]
    fn host_error_is_error_trait() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<HostError>();
    }

    #[test]
    fn display_names_missing_interface() {
        let err = HostError::MissingInterface("type registry");
        assert_eq!(err.to_string(), "SDK table has no type registry interface");
    }

    #[test]
    fn display_includes_reason_code() {
        assert!(HostError::UnknownReason(7).to_string().contains('7'));
    }

    #[test]
    fn nul_error_converts_and_keeps_source() {
        let nul = CString::new("Aim\0Split").unwrap_err();
        let err = HostError::from(nul);

        assert!(matches!(err, HostError::InvalidName(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn unit_variants_have_no_source() {
        assert!(HostError::NullSdk.source().is_none());
        assert!(HostError::NullHandle.source().is_none());
    }
}
