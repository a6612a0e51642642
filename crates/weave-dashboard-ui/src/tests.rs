use super::{
    render_weave_dashboard_page, render_weave_dashboard_shell, weave_dashboard_fallback_links,
    WeaveDashboardContext, DEFAULT_ISSUE_TITLE, EMPTY_SLUG_STATUS, FAILED_ISSUE_PREFIX,
    ISSUE_ENDPOINT, OPENED_ISSUE_PREFIX, PAGE_GENERATION_TITLE_PREFIX, SLUG_DISALLOWED_CHARS,
    SUBMITTING_STATUS,
};
use weave_github_issues::{RepoRef, WEAVE_DASHBOARD_REPO};

fn dashboard_repo() -> RepoRef {
    RepoRef::parse(WEAVE_DASHBOARD_REPO).expect("parse dashboard repo")
}

#[test]
fn functional_fallback_links_prefill_github_new_issue_form() {
    let links = weave_dashboard_fallback_links(&dashboard_repo());
    let titles: Vec<&str> = links.iter().map(|link| link.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "GEN: page /hello2",
            "GEN: page /about",
            "DEL: page /about",
            "UPGRADE: dashboard v1",
        ]
    );
    for link in &links {
        assert!(link
            .href
            .starts_with("https://github.com/lnooroa/weave-dashboard/issues/new?title="));
    }
}

#[test]
fn functional_render_shell_includes_dashboard_markers() {
    let html = render_weave_dashboard_shell(&WeaveDashboardContext::new(dashboard_repo(), true));
    assert!(html.contains("id=\"weave-dashboard\""));
    assert!(html.contains("data-repo=\"lnooroa/weave-dashboard\""));
    assert!(html.contains("id=\"weave-fallback-links\""));
    assert!(html.contains("data-link-count=\"4\""));
    assert!(html.contains("id=\"weave-fallback-link-3\""));
    assert!(html.contains("id=\"weave-title-input\""));
    assert!(html.contains("id=\"weave-issue-status\""));
    assert!(html.contains("href=\"/api/health\""));
    assert!(html.contains(DEFAULT_ISSUE_TITLE));
}

#[test]
fn functional_render_shell_marks_credential_presence() {
    let with_credential =
        render_weave_dashboard_shell(&WeaveDashboardContext::new(dashboard_repo(), true));
    assert!(with_credential.contains("data-has-credential=\"true\""));

    let without_credential =
        render_weave_dashboard_shell(&WeaveDashboardContext::new(dashboard_repo(), false));
    assert!(without_credential.contains("data-has-credential=\"false\""));
    assert!(without_credential.contains("Use the fallback links above instead."));
}

#[test]
fn functional_render_page_wraps_shell_with_issue_form_script() {
    let html = render_weave_dashboard_page(&WeaveDashboardContext::new(dashboard_repo(), false));
    assert!(html.starts_with("<!doctype html>"));
    assert!(html.contains("<title>Weave Dashboard</title>"));
    assert!(html.contains(&format!("const ISSUE_ENDPOINT = \"{ISSUE_ENDPOINT}\";")));
    assert!(html.contains("id=\"weave-dashboard\""));
}

#[test]
fn functional_render_page_script_uses_shared_status_and_slug_literals() {
    let html = render_weave_dashboard_page(&WeaveDashboardContext::new(dashboard_repo(), true));
    assert!(html.contains(&format!("return \"{OPENED_ISSUE_PREFIX}\" + result.number;")));
    assert!(html.contains(&format!(
        "return \"{FAILED_ISSUE_PREFIX}\" + ((result && (result.status || result.error)) || \"error\");"
    )));
    assert!(html.contains(&format!(
        ".replace(/{SLUG_DISALLOWED_CHARS}/gi, \"\").replace(/^\\/+/, \"\")"
    )));
    assert!(html.contains(&format!("submitIssue(\"{PAGE_GENERATION_TITLE_PREFIX}\" + slug);")));
    assert!(html.contains(&format!("statusLine.textContent = \"{EMPTY_SLUG_STATUS}\";")));
    assert!(html.contains(&format!("statusLine.textContent = \"{SUBMITTING_STATUS}\";")));
    assert!(!html.contains("{opened_prefix}"));
}

#[test]
fn unit_fallback_generation_titles_share_page_generation_prefix() {
    let links = weave_dashboard_fallback_links(&dashboard_repo());
    assert!(links[0].title.starts_with(PAGE_GENERATION_TITLE_PREFIX));
    assert!(links[1].title.starts_with(PAGE_GENERATION_TITLE_PREFIX));
}
