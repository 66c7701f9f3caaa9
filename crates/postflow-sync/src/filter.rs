//! Project filtering for the visible view.

use postflow_models::{Project, ProjectStatus};

/// Filter criteria narrowing the visible project set.
///
/// Pure value object: recomputed against the full project set whenever
/// either side changes, never cached. `None` on a criterion means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    /// Filter by status. `None` is the "all" sentinel.
    pub status: Option<ProjectStatus>,
    /// Filter by assigned editor, exact match.
    pub editor: Option<String>,
    /// Filter by client name, exact match.
    pub client: Option<String>,
}

impl ProjectFilter {
    /// Creates a new empty filter (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status criterion.
    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the editor criterion.
    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = Some(editor.into());
        self
    }

    /// Sets the client criterion.
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    /// Returns true if the project matches all set criteria.
    pub fn matches(&self, project: &Project) -> bool {
        if let Some(status) = self.status {
            if project.status != status {
                return false;
            }
        }

        if let Some(ref editor) = self.editor {
            if project.assigned_editor != *editor {
                return false;
            }
        }

        if let Some(ref client) = self.client {
            if project.client_name != *client {
                return false;
            }
        }

        true
    }

    /// Stable filter: the matching subset of `projects`, in input order.
    pub fn apply(&self, projects: &[Project]) -> Vec<Project> {
        projects
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_project(title: &str, client: &str, editor: &str, status: ProjectStatus) -> Project {
        Project::new(title, client, editor, status)
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = ProjectFilter::new();
        let project = make_project("Promo Video", "Acme", "Jo", ProjectStatus::Pending);
        assert!(filter.matches(&project));
    }

    #[test]
    fn test_empty_filter_apply_is_identity() {
        let filter = ProjectFilter::new();
        let projects = vec![
            make_project("A", "Acme", "Jo", ProjectStatus::Pending),
            make_project("B", "Initech", "Sam", ProjectStatus::Completed),
        ];

        let visible = filter.apply(&projects);

        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].title, "A");
        assert_eq!(visible[1].title, "B");
    }

    #[test]
    fn test_filter_by_status() {
        let filter = ProjectFilter::new().with_status(ProjectStatus::Completed);

        let pending = make_project("A", "Acme", "Jo", ProjectStatus::Pending);
        let completed = make_project("B", "Acme", "Jo", ProjectStatus::Completed);

        assert!(!filter.matches(&pending));
        assert!(filter.matches(&completed));
    }

    #[test]
    fn test_filter_by_editor_exact_match() {
        let filter = ProjectFilter::new().with_editor("Jo");

        let jo = make_project("A", "Acme", "Jo", ProjectStatus::Pending);
        let sam = make_project("B", "Acme", "Sam", ProjectStatus::Pending);
        let lowercase = make_project("C", "Acme", "jo", ProjectStatus::Pending);

        assert!(filter.matches(&jo));
        assert!(!filter.matches(&sam));
        assert!(!filter.matches(&lowercase));
    }

    #[test]
    fn test_filter_by_client() {
        let filter = ProjectFilter::new().with_client("Acme");

        let acme = make_project("A", "Acme", "Jo", ProjectStatus::Pending);
        let initech = make_project("B", "Initech", "Jo", ProjectStatus::Pending);

        assert!(filter.matches(&acme));
        assert!(!filter.matches(&initech));
    }

    #[test]
    fn test_combined_criteria_are_conjunctive() {
        let filter = ProjectFilter::new()
            .with_status(ProjectStatus::Editing)
            .with_editor("Jo")
            .with_client("Acme");

        let all_match = make_project("A", "Acme", "Jo", ProjectStatus::Editing);
        let wrong_client = make_project("B", "Initech", "Jo", ProjectStatus::Editing);
        let wrong_status = make_project("C", "Acme", "Jo", ProjectStatus::Review);

        assert!(filter.matches(&all_match));
        assert!(!filter.matches(&wrong_client));
        assert!(!filter.matches(&wrong_status));
    }

    #[test]
    fn test_apply_returns_subset_in_input_order() {
        let projects = vec![
            make_project("A", "Acme", "Jo", ProjectStatus::Pending),
            make_project("B", "Acme", "Sam", ProjectStatus::Editing),
            make_project("C", "Acme", "Jo", ProjectStatus::Editing),
            make_project("D", "Acme", "Jo", ProjectStatus::Completed),
        ];
        let filter = ProjectFilter::new().with_editor("Jo");

        let visible = filter.apply(&projects);

        let titles: Vec<&str> = visible.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C", "D"]);
        // Every visible project came from the input set.
        assert!(visible
            .iter()
            .all(|v| projects.iter().any(|p| p.id == v.id)));
    }

    #[test]
    fn test_status_scenario_from_lifecycle() {
        let projects = vec![
            make_project("A", "Acme", "Jo", ProjectStatus::Pending),
            make_project("B", "Acme", "Jo", ProjectStatus::Completed),
        ];
        let filter = ProjectFilter::new().with_status(ProjectStatus::Completed);

        let visible = filter.apply(&projects);

        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "B");
    }
}
