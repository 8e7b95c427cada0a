// resolver.rs: Call-site resolver.

use std::collections::HashSet;

use lpp_grant::Provenance;

use crate::context::ExecutionContext;
use crate::error::ResolutionError;

/// Distinct provenances of a context, in chain order.
///
/// Domains without an origin are dropped; repeated origins keep their
/// first position.
pub fn resolve(context: &dyn ExecutionContext) -> Result<Vec<Provenance>, ResolutionError> {
    let domains = context.code_domains()?;
    let mut seen = HashSet::new();
    let mut provenances = Vec::new();

    for domain in domains {
        let Some(origin) = domain.origin else {
            continue;
        };
        if origin.trim().is_empty() {
            continue;
        }
        if seen.insert(origin.clone()) {
            provenances.push(Provenance::new(origin));
        }
    }

    Ok(provenances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CapturedContext, CodeDomain};

    struct Opaque;

    impl ExecutionContext for Opaque {
        fn code_domains(&self) -> Result<Vec<CodeDomain>, ResolutionError> {
            Err(ResolutionError::new("no domain list"))
        }
    }

    #[test]
    fn drops_unlocated_and_duplicates() {
        let ctx = CapturedContext::new(vec![
            CodeDomain::located("file:/b.jar"),
            CodeDomain::unlocated(),
            CodeDomain::located("file:/a.jar"),
            CodeDomain::located("file:/b.jar"),
            CodeDomain::located(""),
        ]);
        let resolved = resolve(&ctx).unwrap();
        assert_eq!(
            resolved,
            vec![Provenance::new("file:/b.jar"), Provenance::new("file:/a.jar")]
        );
    }

    #[test]
    fn empty_context_resolves_to_nothing() {
        assert!(resolve(&CapturedContext::default()).unwrap().is_empty());
    }

    #[test]
    fn opaque_context_is_an_error() {
        let err = resolve(&Opaque).unwrap_err();
        assert_eq!(err.reason, "no domain list");
    }
}
