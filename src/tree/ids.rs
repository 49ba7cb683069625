// Deterministic node identifiers.
// Containers derive from repository coordinates; leaves reuse upstream ids where one exists.

pub fn organization(login: &str) -> String {
    format!("org-{}", login)
}

pub fn repository(owner: &str, name: &str) -> String {
    format!("repo-{}-{}", owner, name)
}

pub fn workflows(owner: &str, name: &str) -> String {
    format!("workflows-{}-{}", owner, name)
}

pub fn workflow(id: u64) -> String {
    format!("workflow-{}", id)
}

pub fn workflow_runs(owner: &str, name: &str) -> String {
    format!("runs-{}-{}", owner, name)
}

pub fn workflow_run(id: u64) -> String {
    format!("run-{}", id)
}

pub fn runners(owner: &str, name: &str) -> String {
    format!("runners-{}-{}", owner, name)
}

pub fn runner(id: u64) -> String {
    format!("runner-{}", id)
}

pub fn branches(owner: &str, name: &str) -> String {
    format!("branches-{}-{}", owner, name)
}

/// Branches have no numeric id upstream, so the key is composite.
pub fn branch(owner: &str, name: &str, branch: &str) -> String {
    format!("branch-{}-{}-{}", owner, name, branch)
}

pub fn pull_requests(owner: &str, name: &str) -> String {
    format!("prs-{}-{}", owner, name)
}

pub fn pull_request(id: u64) -> String {
    format!("pr-{}", id)
}

pub fn issues(owner: &str, name: &str) -> String {
    format!("issues-{}-{}", owner, name)
}

pub fn issue(id: u64) -> String {
    format!("issue-{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_ids() {
        assert_eq!(workflows("acme", "a"), "workflows-acme-a");
        assert_eq!(workflow_runs("acme", "a"), "runs-acme-a");
        assert_eq!(runners("acme", "a"), "runners-acme-a");
        assert_eq!(branches("acme", "a"), "branches-acme-a");
        assert_eq!(pull_requests("acme", "a"), "prs-acme-a");
        assert_eq!(issues("acme", "a"), "issues-acme-a");
    }

    #[test]
    fn test_leaf_ids() {
        assert_eq!(organization("acme"), "org-acme");
        assert_eq!(repository("acme", "a"), "repo-acme-a");
        assert_eq!(workflow(42), "workflow-42");
        assert_eq!(workflow_run(7), "run-7");
        assert_eq!(runner(3), "runner-3");
        assert_eq!(branch("acme", "a", "feature/x"), "branch-acme-a-feature/x");
        assert_eq!(pull_request(99), "pr-99");
        assert_eq!(issue(100), "issue-100");
    }
}
