//! Leptos SSR page for the Weave dashboard.
//!
//! The page drives `POST /api/issue` from two forms and offers pre-filled
//! GitHub "new issue" links as a fallback that needs no backend credential.

use leptos::prelude::*;
use weave_github_issues::{github_new_issue_url, RepoRef};

#[cfg(test)]
mod tests;

pub const ISSUE_ENDPOINT: &str = "/api/issue";
pub const HEALTH_ENDPOINT: &str = "/api/health";
pub const DEFAULT_ISSUE_TITLE: &str = "GEN: page /hello3";
pub const SUBMITTING_STATUS: &str = "Submitting…";
pub const EMPTY_SLUG_STATUS: &str = "Enter a slug";
pub const OPENED_ISSUE_PREFIX: &str = "Opened issue #";
pub const FAILED_ISSUE_PREFIX: &str = "Issue failed: ";
/// Title prefix the site generator reads as "create this page".
pub const PAGE_GENERATION_TITLE_PREFIX: &str = "GEN: page /";
/// Characters removed from a typed slug; everything outside `[A-Za-z0-9/_-]`.
pub const SLUG_DISALLOWED_CHARS: &str = "[^a-z0-9/_-]";

/// Titles offered as pre-filled fallback links, with their link labels.
const FALLBACK_ISSUE_PRESETS: [(&str, &str); 4] = [
    ("Create /hello2", "GEN: page /hello2"),
    ("Create /about", "GEN: page /about"),
    ("Delete /about", "DEL: page /about"),
    ("Re-run upgrade", "UPGRADE: dashboard v1"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
/// Pre-filled GitHub link that opens the new-issue form.
pub struct WeaveDashboardFallbackLink {
    pub label: String,
    pub title: String,
    pub href: String,
}

pub fn weave_dashboard_fallback_links(repo: &RepoRef) -> Vec<WeaveDashboardFallbackLink> {
    FALLBACK_ISSUE_PRESETS
        .iter()
        .map(|(label, title)| WeaveDashboardFallbackLink {
            label: (*label).to_string(),
            title: (*title).to_string(),
            href: github_new_issue_url(repo, title),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaveDashboardContext {
    pub repo: RepoRef,
    pub has_credential: bool,
    pub default_title: String,
}

impl WeaveDashboardContext {
    pub fn new(repo: RepoRef, has_credential: bool) -> Self {
        Self {
            repo,
            has_credential,
            default_title: DEFAULT_ISSUE_TITLE.to_string(),
        }
    }
}

/// Renders the dashboard body markup.
pub fn render_weave_dashboard_shell(context: &WeaveDashboardContext) -> String {
    let repo_slug = context.repo.as_slug();
    let repo_slug_attr = repo_slug.clone();
    let has_credential_attr = if context.has_credential {
        "true"
    } else {
        "false"
    };
    let credential_hint = if context.has_credential {
        "Issue credential configured: the buttons below open issues directly."
    } else {
        "No issue credential configured: the buttons below will report it. Use the fallback links above instead."
    };
    let fallback_links = weave_dashboard_fallback_links(&context.repo);
    let fallback_link_count = fallback_links.len().to_string();
    let default_title = context.default_title.clone();

    let shell = view! {
        <main
            id="weave-dashboard"
            data-app="weave-dashboard"
            data-repo=repo_slug_attr
            data-has-credential=has_credential_attr
        >
            <h1>Weave Dashboard</h1>

            <section id="weave-fallback-links" data-link-count=fallback_link_count>
                <h3>"Generate Page (no typing)"</h3>
                <p>"Tap a link to open a prefilled GitHub Issue (fallback mode):"</p>
                <ul>
                    {fallback_links
                        .into_iter()
                        .enumerate()
                        .map(|(index, link)| {
                            let link_id = format!("weave-fallback-link-{index}");
                            view! {
                                <li>
                                    <a
                                        id=link_id
                                        target="_blank"
                                        data-issue-title=link.title
                                        href=link.href
                                    >
                                        {link.label}
                                    </a>
                                </li>
                            }
                        })
                        .collect_view()}
                </ul>
            </section>

            <section id="weave-native-buttons">
                <h3>"Native buttons (no GitHub screen)"</h3>
                <p id="weave-credential-hint" data-has-credential=has_credential_attr>
                    {credential_hint}
                </p>
                <div class="weave-row">
                    <input id="weave-slug-input" placeholder="slug (e.g. blog)" />
                    <button id="weave-generate-button" type="button">"Generate page"</button>
                </div>
                <div class="weave-row">
                    <input
                        id="weave-title-input"
                        placeholder="Issue title (e.g. \"GEN: page /contact\")"
                        value=default_title
                    />
                    <button id="weave-send-button" type="button">Send</button>
                </div>
                <p id="weave-issue-status" role="status"></p>
            </section>

            <section id="weave-health">
                <h3>Health</h3>
                <ul>
                    <li>"API: "<a id="weave-health-link" href=HEALTH_ENDPOINT target="_blank">{HEALTH_ENDPOINT}</a></li>
                    <li id="weave-health-repo">"Repo: "{repo_slug}</li>
                </ul>
            </section>
        </main>
    };
    shell.to_html()
}

/// Renders the complete HTML document, including the form script.
pub fn render_weave_dashboard_page(context: &WeaveDashboardContext) -> String {
    let shell = render_weave_dashboard_shell(context);
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Weave Dashboard</title>
  <style>
    body {{
      margin: 0;
      padding: 24px;
      font-family: system-ui, Arial, sans-serif;
    }}
    section {{
      margin-top: 24px;
    }}
    .weave-row {{
      display: flex;
      gap: 8px;
      align-items: center;
      margin-top: 8px;
    }}
    .weave-row input {{
      flex: 1;
      padding: 8px;
      border: 1px solid #ccc;
      border-radius: 8px;
    }}
    .weave-row button {{
      padding: 8px 12px;
      border: 1px solid #888;
      border-radius: 8px;
    }}
    #weave-credential-hint {{
      font-size: 14px;
      opacity: 0.8;
    }}
    #weave-issue-status {{
      font-family: ui-monospace, SFMono-Regular, Menlo, monospace;
      font-size: 13px;
    }}
  </style>
</head>
<body>
{shell}
  <script>
    const ISSUE_ENDPOINT = "{issue_endpoint}";
    const statusLine = document.getElementById("weave-issue-status");
    const slugInput = document.getElementById("weave-slug-input");
    const titleInput = document.getElementById("weave-title-input");
    const generateButton = document.getElementById("weave-generate-button");
    const sendButton = document.getElementById("weave-send-button");

    async function postJson(url, data) {{
      const response = await fetch(url, {{
        method: "POST",
        headers: {{ "Content-Type": "application/json" }},
        body: JSON.stringify(data),
      }});
      try {{
        return await response.json();
      }} catch (error) {{
        return {{ ok: false, status: response.status }};
      }}
    }}

    function statusFor(result) {{
      if (result && result.ok) {{
        return "{opened_prefix}" + result.number;
      }}
      return "{failed_prefix}" + ((result && (result.status || result.error)) || "error");
    }}

    async function submitIssue(title) {{
      statusLine.textContent = "{submitting}";
      try {{
        statusLine.textContent = statusFor(await postJson(ISSUE_ENDPOINT, {{ title, body: "" }}));
      }} catch (error) {{
        statusLine.textContent = statusFor({{ ok: false, error: String(error) }});
      }}
    }}

    function sanitizeSlug(raw) {{
      return (raw || "").replace(/{slug_disallowed}/gi, "").replace(/^\/+/, "");
    }}

    function refreshGenerateLabel() {{
      generateButton.textContent = "Generate /" + (sanitizeSlug(slugInput.value) || "…");
    }}

    generateButton.addEventListener("click", () => {{
      const slug = sanitizeSlug(slugInput.value);
      if (!slug) {{
        statusLine.textContent = "{empty_slug}";
        return;
      }}
      submitIssue("{page_prefix}" + slug);
    }});
    sendButton.addEventListener("click", () => submitIssue(titleInput.value));
    slugInput.addEventListener("input", refreshGenerateLabel);
    refreshGenerateLabel();
  </script>
</body>
</html>
"#,
        issue_endpoint = ISSUE_ENDPOINT,
        submitting = SUBMITTING_STATUS,
        empty_slug = EMPTY_SLUG_STATUS,
        opened_prefix = OPENED_ISSUE_PREFIX,
        failed_prefix = FAILED_ISSUE_PREFIX,
        slug_disallowed = SLUG_DISALLOWED_CHARS,
        page_prefix = PAGE_GENERATION_TITLE_PREFIX,
    )
}
