use crate::compose::ManifestUpdater;
use crate::domain::{AffectedArea, AreaType};
use crate::error::{ReleaseError, Result};
use crate::host::HostClient;
use crate::publish::FolderLister;
use serde_json::Value;
use std::collections::HashSet;

/// Rewrites the top-level `"version"` of a JSON package manifest
#[derive(Debug, Clone, Default)]
pub struct JsonManifest;

impl ManifestUpdater for JsonManifest {
    fn update(&self, path: &str, existing: &str, version: &str) -> Result<String> {
        let mut manifest: Value = serde_json::from_str(existing)?;
        let object = manifest.as_object_mut().ok_or_else(|| {
            ReleaseError::config(format!("Manifest '{}' is not a JSON object", path))
        })?;
        object.insert("version".to_string(), Value::String(version.to_string()));

        let mut rendered = serde_json::to_string_pretty(&manifest)?;
        rendered.push('\n');
        Ok(rendered)
    }
}

/// Every manifest a release has to bump, in a stable order.
///
/// That is the root manifest, the manifest at the root of every visible
/// area, and for visible Lambda areas one manifest per layer package under
/// `<root>/layers`.
pub async fn manifest_paths<H: HostClient + ?Sized>(
    lister: &FolderLister<'_, H>,
    areas: &[AffectedArea],
    manifest_name: &str,
    git_ref: &str,
) -> Result<Vec<String>> {
    let mut paths = vec![manifest_name.to_string()];

    for area in areas.iter().filter(|area| area.visible) {
        let root = match &area.sub_project_root {
            Some(root) => root,
            None => continue,
        };
        paths.push(format!("{}/{}", root, manifest_name));

        if area.area_type == AreaType::Lambda {
            let layers = lister.list(&format!("{}/layers", root), git_ref).await?;
            for layer in layers {
                paths.push(format!(
                    "{}/nodejs/node_modules/{}/{}",
                    layer.path, layer.name, manifest_name
                ));
            }
        }
    }

    let mut seen = HashSet::new();
    paths.retain(|path| seen.insert(path.clone()));
    Ok(paths)
}
