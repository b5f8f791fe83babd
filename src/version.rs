//! Best-effort version lookup for companion tools logged next to a backup.

use std::fmt;
use std::process::Command;

type Lookup = Box<dyn Fn() -> Option<String>>;

/// A named tool whose version is recorded with every backup, if available.
pub struct Companion {
    name: String,
    lookup: Lookup,
}

impl Companion {
    /// Companion with a custom lookup. Returning `None` means "not installed".
    pub fn new(name: impl Into<String>, lookup: impl Fn() -> Option<String> + 'static) -> Self {
        Self {
            name: name.into(),
            lookup: Box::new(lookup),
        }
    }

    /// Companion resolved by running `<program> --version`.
    pub fn executable(program: impl Into<String>) -> Self {
        let program = program.into();
        let cmd = program.clone();
        Self::new(program, move || executable_version(&cmd))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<String> {
        (self.lookup)()
    }
}

impl fmt::Debug for Companion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Companion").field("name", &self.name).finish()
    }
}

/// Runs `<program> --version` and returns the first non-empty output line.
///
/// Some tools print their version on stderr, so it is checked too. A program
/// that cannot be spawned or exits unsuccessfully yields `None`.
pub fn executable_version(program: &str) -> Option<String> {
    let output = Command::new(program).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    [output.stdout, output.stderr].iter().find_map(|bytes| {
        String::from_utf8_lossy(bytes)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_lookup() {
        let present = Companion::new("torch", || Some("2.4.0".into()));
        let absent = Companion::new("gorilla3d", || None);
        assert_eq!(present.name(), "torch");
        assert_eq!(present.version().as_deref(), Some("2.4.0"));
        assert_eq!(absent.version(), None);
    }

    #[test]
    fn test_missing_executable() {
        assert_eq!(executable_version("snapkit-no-such-program-93a1"), None);
        let companion = Companion::executable("snapkit-no-such-program-93a1");
        assert_eq!(companion.version(), None);
    }
}
