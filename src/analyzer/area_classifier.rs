use crate::domain::{capitalize, AffectedArea, AreaType};
use std::collections::HashSet;

/// Lambda sub-folders whose children are separately versioned packages
const NESTED_FOLDERS: [&str; 2] = ["functions", "layers"];

/// Maps changed file paths to the sub-projects they belong to.
///
/// Path taxonomy, most specific first:
///
/// - `service/lambda/<name>/{functions,layers}/<sub>/...`: a hidden area for
///   the nested package plus the visible parent Lambda
/// - `service/lambda/<name>/...`: a Lambda project
/// - `service/<name>/...`: an ECS service
/// - `infra/...`: infrastructure, one area per file
/// - anything else: one `Other` area per file
pub struct AreaClassifier;

impl AreaClassifier {
    /// Classify a change set.
    ///
    /// Each `(root or entity, type)` pair is reported once no matter how many
    /// files map to it. The result is ordered by that pair.
    pub fn classify<S: AsRef<str>>(files: &[S]) -> Vec<AffectedArea> {
        let mut seen = HashSet::new();
        let mut areas = Vec::new();

        for file in files {
            for area in Self::areas_for(file.as_ref()) {
                if seen.insert(area.fingerprint()) {
                    areas.push(area);
                }
            }
        }

        areas.sort_by(|a, b| {
            a.identity()
                .cmp(b.identity())
                .then(a.area_type.cmp(&b.area_type))
        });
        areas
    }

    /// Areas a single path belongs to, nested area first
    pub fn areas_for(filename: &str) -> Vec<AffectedArea> {
        let segments: Vec<&str> = filename.split('/').collect();

        match segments.as_slice() {
            ["service", "lambda", lambda, rest @ ..] if !rest.is_empty() && !lambda.is_empty() => {
                let parent = Self::lambda_area(lambda);

                match rest {
                    [folder, sub, _, ..] if NESTED_FOLDERS.contains(folder) && !sub.is_empty() => {
                        let nested = Self::nested_area(lambda, folder, sub);
                        vec![nested, parent]
                    }
                    _ => vec![parent],
                }
            }
            ["service", service, _, ..] if *service != "lambda" && !service.is_empty() => {
                vec![AffectedArea::new(
                    capitalize(service),
                    AreaType::Ecs,
                    Some(format!("service/{}", service)),
                    true,
                )]
            }
            ["infra", _, ..] => vec![AffectedArea::new(
                filename,
                AreaType::Infrastructure,
                None,
                true,
            )],
            _ => vec![AffectedArea::new(filename, AreaType::Other, None, true)],
        }
    }

    fn lambda_area(lambda: &str) -> AffectedArea {
        AffectedArea::new(
            capitalize(lambda),
            AreaType::Lambda,
            Some(format!("service/lambda/{}", lambda)),
            true,
        )
    }

    fn nested_area(lambda: &str, folder: &str, sub: &str) -> AffectedArea {
        let mut root = format!("service/lambda/{}/{}/{}", lambda, folder, sub);
        if folder == "layers" {
            root.push_str(&format!("/nodejs/node_modules/{}", sub));
        }

        AffectedArea::new(capitalize(sub), AreaType::Lambda, Some(root), false)
    }
}
