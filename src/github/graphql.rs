use crate::data::Issue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const COUNT_QUERY: &str = "query IssueCount($query: String!) {
  search(query: $query, type: ISSUE, first: 1) {
    issueCount
  }
}";

pub const SEARCH_QUERY: &str = "query SearchIssues($query: String!, $after: String) {
  search(query: $query, type: ISSUE, first: 100, after: $after) {
    issueCount
    pageInfo { hasNextPage endCursor }
    nodes {
      __typename
      ... on Issue {
        number createdAt closedAt
        author { login }
        milestone { title }
        labels(first: 100) { nodes { name } }
        participants(first: 100) { nodes { login } }
      }
      ... on PullRequest {
        number createdAt closedAt
        author { login }
        milestone { title }
        labels(first: 100) { nodes { name } }
        participants(first: 100) { nodes { login } }
      }
    }
  }
}";

pub const ASSIGNABLE_USERS_QUERY: &str = "query AssignableUsers($owner: String!, $name: String!, $after: String) {
  repository(owner: $owner, name: $name) {
    assignableUsers(first: 100, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes { login }
    }
  }
}";

/// Login GitHub reports for issues whose author account was deleted.
const GHOST_LOGIN: &str = "ghost";

#[derive(Debug, Serialize)]
pub struct Request<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Serialize)]
pub struct CountVariables<'a> {
    pub query: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SearchVariables<'a> {
    pub query: &'a str,
    pub after: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct RepositoryVariables<'a> {
    pub owner: &'a str,
    pub name: &'a str,
    pub after: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct Response<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<ResponseError>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseError {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl ResponseError {
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        self.kind.as_deref() == Some("RATE_LIMITED")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Nodes<T> {
    #[serde(default)]
    pub nodes: Vec<Option<T>>,
}

#[derive(Debug, Deserialize)]
pub struct CountData {
    pub search: CountSearch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountSearch {
    pub issue_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: SearchConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConnection {
    pub issue_count: u64,
    pub page_info: PageInfo,
    #[serde(default)]
    pub nodes: Vec<Option<SearchNode>>,
}

/// A search hit. Search can also return types other than issues and pull requests, which are skipped.
#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub enum SearchNode {
    Issue(IssueNode),
    PullRequest(IssueNode),
    #[serde(other)]
    Other,
}

impl SearchNode {
    pub fn into_issue(self) -> Option<Issue> {
        match self {
            Self::Issue(node) => Some(node.into_issue(false)),
            Self::PullRequest(node) => Some(node.into_issue(true)),
            Self::Other => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueNode {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub author: Option<Actor>,
    pub milestone: Option<Milestone>,
    pub labels: Option<Nodes<Label>>,
    pub participants: Option<Nodes<Actor>>,
}

impl IssueNode {
    fn into_issue(self, is_pull_request: bool) -> Issue {
        Issue {
            number: self.number,
            author: self.author.map_or_else(|| GHOST_LOGIN.to_string(), |a| a.login),
            created_at: self.created_at,
            closed_at: self.closed_at,
            labels: self
                .labels
                .map(|l| l.nodes.into_iter().flatten().map(|label| label.name).collect())
                .unwrap_or_default(),
            participants: self
                .participants
                .map(|p| p.nodes.into_iter().flatten().map(|actor| actor.login).collect())
                .unwrap_or_default(),
            milestone: self.milestone.map(|m| m.title),
            is_pull_request,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Actor {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Milestone {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryData {
    pub repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub assignable_users: AssignableUsers,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignableUsers {
    pub page_info: PageInfo,
    #[serde(default)]
    pub nodes: Vec<Option<Actor>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_response_deserialize() {
        let json = r#"{"data": {"search": {"issueCount": 42}}}"#;
        let response: Response<CountData> = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.unwrap().search.issue_count, 42);
        assert!(response.errors.is_empty());
    }

    #[test]
    fn test_error_response_deserialize() {
        let json = r#"{
            "data": null,
            "errors": [{"type": "RATE_LIMITED", "message": "API rate limit exceeded"}]
        }"#;
        let response: Response<CountData> = serde_json::from_str(json).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].is_rate_limit());
        assert_eq!(response.errors[0].message, "API rate limit exceeded");
    }

    #[test]
    fn test_search_response_deserialize() {
        let json = r#"{
            "data": {
                "search": {
                    "issueCount": 3,
                    "pageInfo": {"hasNextPage": true, "endCursor": "Y3Vyc29yOjE="},
                    "nodes": [
                        {
                            "__typename": "Issue",
                            "number": 12,
                            "createdAt": "2020-01-02T10:00:00Z",
                            "closedAt": null,
                            "author": {"login": "alice"},
                            "milestone": {"title": "2.3.0"},
                            "labels": {"nodes": [{"name": "type: bug"}]},
                            "participants": {"nodes": [{"login": "alice"}, {"login": "bob"}]}
                        },
                        {
                            "__typename": "PullRequest",
                            "number": 13,
                            "createdAt": "2020-01-03T10:00:00Z",
                            "closedAt": "2020-01-04T10:00:00Z",
                            "author": null,
                            "milestone": null,
                            "labels": {"nodes": []},
                            "participants": {"nodes": []}
                        },
                        {"__typename": "Discussion"},
                        null
                    ]
                }
            }
        }"#;

        let response: Response<SearchData> = serde_json::from_str(json).unwrap();
        let search = response.data.unwrap().search;
        assert_eq!(search.issue_count, 3);
        assert!(search.page_info.has_next_page);
        assert_eq!(search.page_info.end_cursor.as_deref(), Some("Y3Vyc29yOjE="));

        let issues: Vec<Issue> = search.nodes.into_iter().flatten().filter_map(SearchNode::into_issue).collect();
        assert_eq!(issues.len(), 2);

        assert_eq!(issues[0].number, 12);
        assert_eq!(issues[0].author, "alice");
        assert!(issues[0].is_open());
        assert_eq!(issues[0].milestone.as_deref(), Some("2.3.0"));
        assert!(issues[0].labels.contains("type: bug"));
        assert_eq!(issues[0].participants.len(), 2);
        assert!(!issues[0].is_pull_request);

        assert_eq!(issues[1].author, "ghost");
        assert!(!issues[1].is_open());
        assert!(issues[1].is_pull_request);
        assert!(issues[1].milestone.is_none());
    }

    #[test]
    fn test_nodes_without_default_items() {
        let labels: Nodes<Label> = serde_json::from_str(r#"{"nodes": [{"name": "bug"}, null]}"#).unwrap();
        assert_eq!(labels.nodes.len(), 2);
        assert_eq!(labels.nodes[0].as_ref().map(|l| l.name.as_str()), Some("bug"));

        let actors: Nodes<Actor> = serde_json::from_str("{}").unwrap();
        assert!(actors.nodes.is_empty());
    }

    #[test]
    fn test_search_variables_serialize_null_cursor() {
        let request = Request {
            query: SEARCH_QUERY,
            variables: SearchVariables {
                query: "repo:a/b",
                after: None,
            },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""variables":{"query":"repo:a/b","after":null}"#));
    }
}
