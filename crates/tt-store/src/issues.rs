//! Issue listing and single-issue operations
use serde_json::{Map, Value, json};
use tt_api::Params;

use crate::{
    actions::Action,
    app::{App, field},
    error::{Result, StoreError},
    query::{IssueQuery, build_issue_params},
    state::IssueData,
};

pub(crate) const ISSUES_PATH: &str = "tt/issues";
pub(crate) const COMMENT_PATH: &str = "tt/comment";
pub(crate) const FILE_PATH: &str = "tt/file";

fn issue_path(issue_id: &str) -> String {
    format!("tt/issue/{}", issue_id)
}

fn action_path(issue_id: &str) -> String {
    format!("tt/action/{}", issue_id)
}

impl App {
    /// List one page of issues for the current (or overridden) selection
    ///
    /// Validation happens before any request is made.
    pub async fn get_issues(&self, query: &IssueQuery) -> Result<Value> {
        let params = build_issue_params(query, &self.selection())?;
        let body = self.api().get(ISSUES_PATH, &params).await?;
        field(body, "issues")
    }

    /// Fetch one issue; with `save` it becomes the current issue and its
    /// project becomes the selected project
    pub async fn get_issue(&self, issue_id: &str, save: bool) -> Result<IssueData> {
        let body = self.api().get(&issue_path(issue_id), &Params::new()).await?;
        let issue: IssueData = field(body, "issue")?;

        if save {
            self.dispatch(Action::IssueLoaded(issue.clone())).await;
            let project = self.resolve_project(&issue.issue.project)?;
            self.set_project(Some(project)).await;
        }

        Ok(issue)
    }

    /// Re-fetch the current issue
    pub async fn update_issue(&self) -> Result<IssueData> {
        let issue_id = self.current_issue_id().ok_or_else(StoreError::issue_not_selected)?;
        self.get_issue(&issue_id, true).await
    }

    pub async fn delete_issue(&self, issue_id: Option<&str>) -> Result<Value> {
        let issue_id = self.issue_id_or_current(issue_id)?;
        Ok(self.api().delete(&issue_path(&issue_id)).await?)
    }

    pub async fn add_comment(&self, comment: &str, private: bool, issue_id: Option<&str>) -> Result<Value> {
        let issue_id = self.issue_id_or_current(issue_id)?;
        let body = json!({
            "issueId": issue_id,
            "comment": comment,
            "commentPrivate": private,
        });
        Ok(self.api().post(COMMENT_PATH, Some(body)).await?)
    }

    /// Edit the `index`-th comment of the current issue
    pub async fn edit_comment(&self, comment: &str, private: bool, index: usize) -> Result<Value> {
        let issue_id = self.issue_id_or_current(None)?;
        let body = json!({
            "issueId": issue_id,
            "comment": comment,
            "commentPrivate": private,
            "commentIndex": index,
        });
        Ok(self.api().put(COMMENT_PATH, Some(body)).await?)
    }

    /// Attach a file (as produced by the file picker) to the current issue
    pub async fn add_attachment(&self, attachment: Value) -> Result<Value> {
        let issue_id = self.issue_id_or_current(None)?;
        let body = json!({
            "issueId": issue_id,
            "attachments": [attachment],
        });
        Ok(self.api().post(FILE_PATH, Some(body)).await?)
    }

    /// Run a workflow action, optionally setting fields on the issue
    pub async fn do_action(&self, action: &str, set: Option<Value>, issue_id: Option<&str>) -> Result<Value> {
        let issue_id = self.issue_id_or_current(issue_id)?;

        let mut body = Map::new();
        body.insert("action".to_string(), Value::from(action));
        if let Some(set) = set {
            body.insert("set".to_string(), set);
        }

        Ok(self.api().put(&action_path(&issue_id), Some(Value::Object(body))).await?)
    }

    fn current_issue_id(&self) -> Option<String> {
        self.with_state(|state| state.tt.issue.as_ref().map(|data| data.issue.issue_id.clone()))
    }

    fn issue_id_or_current(&self, issue_id: Option<&str>) -> Result<String> {
        issue_id
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| self.current_issue_id())
            .ok_or_else(StoreError::issue_not_selected)
    }
}
