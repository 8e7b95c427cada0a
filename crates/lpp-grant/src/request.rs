// request.rs: Capability requests and code provenance.
//
// A CapabilityRequest is what the surrounding runtime asks about at check
// time: a kind (which family of resource), a target (which resource) and
// an action list ("read", "write,delete", "connect,resolve"). A Provenance
// is the code origin held responsible for the request.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known permission kinds. Runtimes are free to use their own.
pub mod kinds {
    pub const FILE: &str = "FilePermission";
    pub const SOCKET: &str = "SocketPermission";
    pub const PROPERTY: &str = "PropertyPermission";
    pub const RUNTIME: &str = "RuntimePermission";
}

/// A single resource access being checked.
///
/// Immutable once built: the profiler only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityRequest {
    kind: String,
    target: String,
    actions: String,
}

impl CapabilityRequest {
    pub fn new(
        kind: impl Into<String>,
        target: impl Into<String>,
        actions: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            target: target.into(),
            actions: actions.into(),
        }
    }

    /// A filesystem access, e.g. `file("/etc/hosts", "read")`.
    pub fn file(path: impl Into<String>, actions: impl Into<String>) -> Self {
        Self::new(kinds::FILE, path, actions)
    }

    /// A network access, e.g. `socket("example.com:443", "connect,resolve")`.
    pub fn socket(endpoint: impl Into<String>, actions: impl Into<String>) -> Self {
        Self::new(kinds::SOCKET, endpoint, actions)
    }

    /// A process property access, e.g. `property("user.home", "read")`.
    pub fn property(name: impl Into<String>, actions: impl Into<String>) -> Self {
        Self::new(kinds::PROPERTY, name, actions)
    }

    /// A runtime capability with no action list, e.g. `runtime("exitVM")`.
    pub fn runtime(name: impl Into<String>) -> Self {
        Self::new(kinds::RUNTIME, name, "")
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn actions(&self) -> &str {
        &self.actions
    }
}

impl fmt::Display for CapabilityRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.kind, self.target, self.actions)
    }
}

/// The code origin attributable as the source of a request.
///
/// Usually a URL or path of the loaded code unit (`file:/app/lib/core.jar`).
/// An empty location means the origin could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Provenance(String);

impl Provenance {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn location(&self) -> &str {
        &self.0
    }

    /// Whether this provenance names an actual location.
    pub fn is_located(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_kind() {
        assert_eq!(CapabilityRequest::file("/a", "read").kind(), kinds::FILE);
        assert_eq!(
            CapabilityRequest::socket("h:80", "connect").kind(),
            kinds::SOCKET
        );
        assert_eq!(
            CapabilityRequest::property("user.home", "read").kind(),
            kinds::PROPERTY
        );
        let exit = CapabilityRequest::runtime("exitVM");
        assert_eq!(exit.kind(), kinds::RUNTIME);
        assert_eq!(exit.actions(), "");
    }

    #[test]
    fn blank_provenance_is_not_located() {
        assert!(!Provenance::new("").is_located());
        assert!(!Provenance::new("   ").is_located());
        assert!(Provenance::new("file:/app.jar").is_located());
    }

    #[test]
    fn display_is_compact() {
        let req = CapabilityRequest::file("/tmp/x", "read,write");
        assert_eq!(req.to_string(), "FilePermission(/tmp/x, read,write)");
    }
}
