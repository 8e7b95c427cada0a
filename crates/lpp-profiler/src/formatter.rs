// formatter.rs: Turns (request, provenance) into the rule line to record.

use lpp_grant::{CapabilityRequest, GrantRule, Provenance};

/// Formats grant rules, refusing the ones that must not be reported.
#[derive(Debug, Clone, Default)]
pub struct RuleFormatter {
    self_origin: Option<String>,
}

impl RuleFormatter {
    /// `self_origin` is the profiler's own code origin, if known.
    pub fn new(self_origin: Option<String>) -> Self {
        Self { self_origin }
    }

    /// The canonical rule text, or `None` when the provenance has no
    /// location or is the profiler itself.
    pub fn format(&self, request: &CapabilityRequest, provenance: &Provenance) -> Option<String> {
        if !provenance.is_located() {
            return None;
        }
        if self.self_origin.as_deref() == Some(provenance.location()) {
            return None;
        }
        Some(GrantRule::new(provenance, request).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_located_provenance() {
        let f = RuleFormatter::new(None);
        let line = f
            .format(
                &CapabilityRequest::socket("localhost:8080", "listen"),
                &Provenance::new("file:/srv/app.jar"),
            )
            .unwrap();
        assert_eq!(
            line,
            "grant codeBase \"file:/srv/app.jar\" { permission SocketPermission \"localhost:8080\", \"listen\"; };"
        );
    }

    #[test]
    fn own_origin_is_not_reported() {
        let f = RuleFormatter::new(Some("file:/opt/lpp.so".to_string()));
        let req = CapabilityRequest::file("policy-rules.txt", "write");
        assert!(f.format(&req, &Provenance::new("file:/opt/lpp.so")).is_none());
        assert!(f.format(&req, &Provenance::new("file:/app.jar")).is_some());
    }

    #[test]
    fn unlocated_provenance_is_not_reported() {
        let f = RuleFormatter::default();
        let req = CapabilityRequest::property("java.home", "read");
        assert!(f.format(&req, &Provenance::new("")).is_none());
    }
}
