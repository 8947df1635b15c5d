/// Branch naming convention that drives the version bump.
///
/// Only the token before the first `/` matters: `flight/checkout-v2` is a
/// flight branch, `hotfix/login-crash` a hotfix branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchPrefix {
    /// Feature train, bumps the minor version
    Flight,
    /// Production fix, bumps the patch version
    Hotfix,
    /// Anything else, keeps the current version
    Other(String),
}

impl BranchPrefix {
    pub fn from_branch(branch_name: &str) -> Self {
        let prefix = branch_name.split('/').next().unwrap_or_default();

        match prefix {
            "flight" => BranchPrefix::Flight,
            "hotfix" => BranchPrefix::Hotfix,
            other => BranchPrefix::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BranchPrefix::Flight => "flight",
            BranchPrefix::Hotfix => "hotfix",
            BranchPrefix::Other(prefix) => prefix,
        }
    }
}
