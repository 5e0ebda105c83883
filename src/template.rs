//! Presentation template loading and injection
//!
//! The page template, stylesheet, and script can be supplied from an assets
//! directory; each piece independently falls back to its built-in default,
//! so a missing or partial assets directory is never fatal. Both the loaded
//! template and the built-in honor the same injection contract:
//! `/* INJECT_STYLES */`, `/* INJECT_SCRIPT */`, `/* INJECT_DATA */`,
//! `{{TITLE}}`, `<!-- INJECT_LOGO -->`, and `<!-- INJECT_BODY -->`.

use crate::render::rows::escape_html;
use crate::ReportData;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::fs;
use std::path::Path;

pub const TEMPLATE_FILENAME: &str = "template.html";
pub const STYLES_FILENAME: &str = "styles.css";
pub const SCRIPT_FILENAME: &str = "report.js";

/// Resolved presentation assets, ready for injection
pub struct TemplateAssets {
    pub template: String,
    pub styles: String,
    pub script: String,
    pub logo_html: String,
}

impl TemplateAssets {
    /// The built-in presentation, used when no assets directory is given
    pub fn builtin() -> Self {
        Self {
            template: BUILTIN_TEMPLATE.to_string(),
            styles: BUILTIN_STYLES.to_string(),
            script: BUILTIN_SCRIPT.to_string(),
            logo_html: String::new(),
        }
    }

    /// Load assets, falling back per piece: a missing template, stylesheet,
    /// or script uses its built-in; a missing or unreadable logo renders
    /// nothing.
    pub fn load(assets_dir: Option<&Path>, logo: Option<&Path>) -> Self {
        let mut assets = Self::builtin();
        if let Some(dir) = assets_dir {
            if let Ok(template) = fs::read_to_string(dir.join(TEMPLATE_FILENAME)) {
                assets.template = template;
            }
            if let Ok(styles) = fs::read_to_string(dir.join(STYLES_FILENAME)) {
                assets.styles = styles;
            }
            if let Ok(script) = fs::read_to_string(dir.join(SCRIPT_FILENAME)) {
                assets.script = script;
            }
        }
        if let Some(logo_path) = logo {
            assets.logo_html = logo_html(logo_path);
        }
        assets
    }
}

impl Default for TemplateAssets {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Inline `<img>` with the logo embedded as a base64 data URI; an absent or
/// unreadable file yields no markup.
fn logo_html(path: &Path) -> String {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return String::new(),
    };
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("gif") => "image/gif",
        _ => "image/png",
    };
    format!(
        "<img class=\"logo\" src=\"data:{};base64,{}\" alt=\"Logo\">",
        mime,
        BASE64.encode(bytes)
    )
}

/// Escapes a JSON payload for embedding inside an inline script block, so
/// a literal `</script>` in test data cannot terminate it early.
fn escape_json_for_script(s: &str) -> String {
    s.replace("</script>", "<\\/script>")
}

/// Render the full interactive report page: pre-rendered body plus the
/// embedded snapshot JSON for external consumers.
pub fn render_page(assets: &TemplateAssets, title: &str, body: &str, data: &ReportData) -> String {
    let data_json = serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string());
    inject(assets, title, body, &escape_json_for_script(&data_json), &assets.script)
}

/// Render the print/export document: same template, fully static, with no
/// embedded data payload and no script.
pub fn render_print_page(assets: &TemplateAssets, title: &str, body: &str) -> String {
    inject(assets, title, body, "null", "")
}

fn inject(
    assets: &TemplateAssets,
    title: &str,
    body: &str,
    data_json: &str,
    script: &str,
) -> String {
    assets
        .template
        .replace("/* INJECT_STYLES */", &assets.styles)
        .replace("/* INJECT_SCRIPT */", script)
        .replace("/* INJECT_DATA */", data_json)
        .replace("{{TITLE}}", &escape_html(title))
        .replace("<!-- INJECT_LOGO -->", &assets.logo_html)
        .replace("<!-- INJECT_BODY -->", body)
}

const BUILTIN_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{TITLE}}</title>
<style>/* INJECT_STYLES */</style>
</head>
<body>
<header class="header"><!-- INJECT_LOGO --><h1>{{TITLE}}</h1></header>
<main id="app"><!-- INJECT_BODY --></main>
<script>
const REPORT_DATA = /* INJECT_DATA */;
/* INJECT_SCRIPT */
</script>
</body>
</html>
"##;

const BUILTIN_STYLES: &str = r##"
:root{--bg:#f8fafc;--surface:#ffffff;--border:#e2e8f0;--text:#0f172a;--muted:#94a3b8;--green:#10b981;--red:#ef4444;--amber:#f59e0b;--blue:#3b82f6;--radius:8px}
*{box-sizing:border-box;margin:0;padding:0}
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:var(--bg);color:var(--text);line-height:1.5;padding:1.5rem}
.header{display:flex;align-items:center;gap:1rem;margin-bottom:1rem}
.header h1{font-size:1.25rem}
.header .logo{height:36px}
.header .meta{font-size:.8125rem;color:var(--muted)}
.summary{display:flex;gap:.75rem;margin:1rem 0;flex-wrap:wrap}
.stat{flex:1;min-width:110px;background:var(--surface);border:1px solid var(--border);border-radius:var(--radius);padding:.75rem 1rem;text-align:center}
.stat .val{display:block;font-size:1.5rem;font-weight:700}
.stat .val.passed{color:var(--green)}
.stat .val.failed{color:var(--red)}
.stat .val.skipped{color:var(--amber)}
.stat .lbl{font-size:.75rem;color:var(--muted);text-transform:uppercase;letter-spacing:.5px}
.chart{display:flex;align-items:center;gap:1.5rem;margin:1rem 0}
.doughnut{width:120px;height:120px;border-radius:50%;-webkit-mask:radial-gradient(circle,transparent 40%,#000 41%);mask:radial-gradient(circle,transparent 40%,#000 41%)}
.chart-legend{list-style:none;font-size:.8125rem}
.chart-legend .dot{display:inline-block;width:10px;height:10px;border-radius:50%;margin-right:6px}
.tabs{display:flex;gap:.5rem;margin:1rem 0 .5rem}
.tab-btn{padding:.4rem .9rem;font-size:.8125rem;font-weight:600;border:1px solid var(--border);border-radius:var(--radius);background:var(--surface);cursor:pointer}
.tab-btn.active{background:var(--blue);color:#fff;border-color:var(--blue)}
.tab-count{font-weight:400;opacity:.8}
.controls{display:flex;gap:.5rem;margin:.5rem 0 1rem;flex-wrap:wrap}
.controls input[type=search]{padding:.45rem .7rem;border:1px solid var(--border);border-radius:var(--radius);font-size:.8125rem;width:220px}
.controls select{padding:.45rem .5rem;border:1px solid var(--border);border-radius:var(--radius);font-size:.8125rem;background:var(--surface)}
.tests-table{width:100%;border-collapse:collapse;background:var(--surface);border:1px solid var(--border);border-radius:var(--radius);font-size:.8125rem}
.tests-table th{text-align:left;padding:.6rem .75rem;border-bottom:2px solid var(--border);font-size:.6875rem;text-transform:uppercase;letter-spacing:.5px;color:var(--muted)}
.tests-table td{padding:.6rem .75rem;border-bottom:1px solid var(--border);vertical-align:top}
.test-name{font-weight:600}
.test-id{font-size:.6875rem;color:var(--muted);font-family:'SF Mono',Consolas,monospace}
.status-badge{display:inline-block;padding:.15rem .5rem;border-radius:10px;font-size:.6875rem;font-weight:700;text-transform:uppercase}
.status-passed{background:#d1fae5;color:#059669}
.status-failed,.status-timedOut{background:#fee2e2;color:#dc2626}
.status-skipped,.status-interrupted{background:#fef3c7;color:#b45309}
.retry-badge{margin-left:.4rem;font-size:.6875rem;color:var(--amber)}
.metadata-tags{display:flex;gap:.25rem;flex-wrap:wrap}
.metadata-tag{padding:.1rem .45rem;border-radius:9px;font-size:.6875rem;background:#e0e7ff;color:#3730a3}
.metadata-tag.owner{background:#f1f5f9;color:#475569}
.severity-blocker,.severity-critical{background:#fee2e2;color:#b91c1c}
.severity-minor,.severity-trivial{background:#f1f5f9;color:#64748b}
.error-cell pre{white-space:pre-wrap;font-size:.6875rem;background:#fef2f2;border:1px solid #fecaca;border-radius:6px;padding:.5rem;max-width:360px;overflow-x:auto}
.error-toggle{color:var(--blue);font-size:.75rem;cursor:pointer;text-decoration:underline}
.comment-field{width:200px;min-height:54px;padding:.4rem;border:1px solid var(--border);border-radius:6px;font-size:.75rem;font-family:inherit;resize:vertical}
.comment-field.empty-comment{border-color:var(--amber);background:#fffbeb}
.section-heading{margin:1.5rem 0 .5rem;font-size:1rem}
.muted{color:var(--muted)}
footer{margin-top:1.5rem;font-size:.75rem;color:var(--muted)}
@media print{.controls,.tabs,.error-toggle{display:none}body{background:#fff;padding:0}}
"##;

// Cosmetic behavior only; partitioning, filtering, and export all run in
// the report generator. One delegated listener per concern.
const BUILTIN_SCRIPT: &str = r##"
(function(){
'use strict';
var app=document.getElementById('app');
if(!app)return;
app.addEventListener('click',function(e){
  var toggle=e.target.closest('.error-toggle');
  if(!toggle)return;
  var content=toggle.previousElementSibling;
  if(!content)return;
  if(content.hidden){content.hidden=false;toggle.textContent='Hide error';}
  else{content.hidden=true;toggle.textContent='Show error';}
});
var comments=(REPORT_DATA&&REPORT_DATA.comments)?Object.assign({},REPORT_DATA.comments):{};
app.addEventListener('input',function(e){
  var field=e.target.closest('.comment-field');
  if(!field)return;
  var id=field.getAttribute('data-test-id');
  var value=field.value.trim();
  if(value){comments[id]=value;}else{delete comments[id];}
});
var download=document.getElementById('download-comments');
if(download){
  download.addEventListener('click',function(){
    var blob=new Blob([JSON.stringify(comments,null,2)],{type:'application/json'});
    var a=document.createElement('a');
    a.href=URL.createObjectURL(blob);
    a.download='comments.json';
    a.click();
    URL.revokeObjectURL(a.href);
  });
}
})();
"##;
