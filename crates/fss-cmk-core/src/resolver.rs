//! Region name to region code resolution

use crate::error::Result;
use crate::services::IdentityService;
use crate::types::RegionMap;
use tracing::debug;

/// Fetch the complete region mapping. One remote read; errors propagate.
pub async fn resolve_regions(identity: &dyn IdentityService) -> Result<RegionMap> {
    let regions = identity.list_regions().await?;
    let map: RegionMap = regions.into_iter().collect();
    debug!("Resolved {} regions", map.len());
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::services::MockIdentityService;
    use crate::types::Region;

    #[tokio::test]
    async fn test_resolve_regions_builds_mapping() {
        let mut identity = MockIdentityService::new();
        identity.expect_list_regions().times(1).returning(|| {
            Ok(vec![
                Region {
                    name: "us-ashburn-1".to_string(),
                    code: "IAD".to_string(),
                },
                Region {
                    name: "eu-frankfurt-1".to_string(),
                    code: "FRA".to_string(),
                },
            ])
        });

        let map = resolve_regions(&identity).await.unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.code_for("eu-frankfurt-1"), Some("FRA"));
    }

    #[tokio::test]
    async fn test_resolve_regions_propagates_error() {
        let mut identity = MockIdentityService::new();
        identity
            .expect_list_regions()
            .returning(|| Err(Error::transport("identity", "connection reset")));

        let err = resolve_regions(&identity).await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
