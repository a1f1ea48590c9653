//! Page sections as maud components.
//!
//! Every function here is a pure mapping from records to [`Markup`]. Empty
//! collections are filtered out by the caller ([`crate::generate::render_page`]),
//! but each component still tolerates missing optional fields: a card
//! without a logo gets an initial, a project without media gets no media
//! element, and so on.
//!
//! Asset URLs go through [`RenderContext::asset`], which drops anything
//! outside the configured host allow-list so the fallback renders instead.
//!
//! Reveal animations are declarative: [`blur_fade`] only emits data
//! attributes and a delay variable; `static/folio.js` does the rest.

use crate::dates::{duration_label, period_label, short_month_year};
use crate::generate::RenderContext;
use crate::layout::{self, CategoryLayout, Placement, Star};
use crate::rich_text::{self, safe_href};
use crate::types::{
    Achievement, Author, Education, LinkKind, Project, ProjectLink, Skill, WorkExperience,
};
use maud::{Markup, html};
use rand::Rng;

/// Base reveal delay, seconds.
pub const BLUR_FADE_DELAY: f64 = 0.04;
/// Extra delay per item in a list, seconds.
pub const STAGGER: f64 = 0.05;
/// Technologies shown before the "Show All" toggle.
pub const TECH_PREVIEW: usize = 8;
/// Leading technologies drawn highlighted.
pub const TECH_HIGHLIGHT: usize = 3;

const WAVE: &str = "👋🏼";

/// `BLUR_FADE_DELAY * step + index * STAGGER`
pub fn delay(step: u32, index: usize) -> f64 {
    BLUR_FADE_DELAY * f64::from(step) + index as f64 * STAGGER
}

/// Wrapper revealed by the in-view observer. With `once = false` it hides
/// again when scrolled out and replays on re-entry.
pub fn blur_fade(delay: f64, once: bool, content: Markup) -> Markup {
    html! {
        div.blur-fade data-blur-fade data-once=(if once { "true" } else { "false" }) style={ "--blur-fade-delay: " (format!("{delay:.2}")) "s" } {
            (content)
        }
    }
}

fn first_char(text: &str) -> String {
    text.trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

fn external_link(href: &str, label: &str) -> Markup {
    html! {
        a.external-link href=(href) target="_blank" rel="noopener noreferrer" aria-label=(label) { "↗" }
    }
}

/// Round image with a text fallback.
pub fn avatar(src: Option<&str>, alt: &str, fallback: &str, class: &str) -> Markup {
    html! {
        span class={ "avatar " (class) } {
            @if let Some(src) = src {
                img src=(src) alt=(alt) loading="lazy";
            } @else {
                span.avatar-fallback aria-hidden="true" { (fallback) }
            }
        }
    }
}

// ============================================================================
// Hero & about
// ============================================================================

pub fn hero(author: &Author, ctx: &RenderContext<'_>) -> Markup {
    let description = rich_text::plain_text(&author.description);
    html! {
        section #hero {
            div.hero {
                div.hero-text {
                    (blur_fade(BLUR_FADE_DELAY, true, html! {
                        h1.hero-title {
                            "Hi, I'm " (author.first_name())
                            span.wave aria-hidden="true" { (WAVE) }
                        }
                    }))
                    @if !description.trim().is_empty() {
                        (blur_fade(BLUR_FADE_DELAY, true, html! {
                            p.hero-description { (description) }
                        }))
                    }
                    @if let Some(location) = author.location.as_deref().filter(|l| !l.trim().is_empty()) {
                        p.hero-location { (location) }
                    }
                }
                (blur_fade(BLUR_FADE_DELAY, true, avatar(
                    ctx.asset(author.avatar_url()),
                    author.name.as_deref().unwrap_or(""),
                    &author.display_initials(),
                    "avatar-hero",
                )))
            }
        }
    }
}

pub fn about(author: &Author, ctx: &RenderContext<'_>) -> Markup {
    html! {
        section #about {
            (blur_fade(delay(3, 0), true, html! { h2 { "About" } }))
            (blur_fade(delay(4, 0), true, html! {
                div.prose { (rich_text::render(&author.summary)) }
            }))
            @if let Some(resume) = ctx.asset(author.resume_url()) {
                (blur_fade(delay(4, 1), true, html! {
                    a.resume-link href=(resume) target="_blank" rel="noopener noreferrer" { "Download résumé" }
                }))
            }
        }
    }
}

// ============================================================================
// Work timeline
// ============================================================================

fn achievement_badge(achievement: &Achievement, index: usize, ctx: &RenderContext<'_>) -> Markup {
    let name = achievement.name.as_deref().unwrap_or("");
    html! {
        span.achievement style={ "animation-delay: " (index * 150) "ms" } {
            @if let Some(icon) = ctx.asset(achievement.icon_url()) {
                img src=(icon) alt=(name) width="18" height="18" loading="lazy";
            }
            span { (name) }
        }
    }
}

pub fn work_card(item: &WorkExperience, ctx: &RenderContext<'_>) -> Markup {
    let company = item.company();
    html! {
        article.work-card {
            header.card-header {
                span.card-logo {
                    @match ctx.asset(item.logo_url()) {
                        Some(logo) => {
                            (avatar(Some(logo), company, &first_char(company), "avatar-logo"))
                        }
                        None => {
                            span.logo-initial aria-hidden="true" { (first_char(company)) }
                        }
                    }
                }
                div.card-heading {
                    h3 { (company) }
                    @if let Some(title) = &item.title {
                        p.card-subtitle { (title) }
                    }
                    @if let Some(location) = &item.location {
                        p.card-meta { (location) }
                    }
                }
                @if let Some(url) = item.url.as_deref().and_then(safe_href) {
                    (external_link(url, company))
                }
            }
            @if !item.achievements.is_empty() {
                div.achievements {
                    @for (i, achievement) in item.achievements.iter().enumerate() {
                        (achievement_badge(achievement, i, ctx))
                    }
                }
            }
            @if !item.description.is_empty() {
                div.prose.card-description { (rich_text::render(&item.description)) }
            }
            @if !item.skills.is_empty() {
                div.badges {
                    @for skill in &item.skills {
                        span.badge.badge-skill { (skill) }
                    }
                }
            }
        }
    }
}

pub fn work_timeline(work: &[WorkExperience], ctx: &RenderContext<'_>) -> Markup {
    html! {
        section #work {
            (blur_fade(delay(5, 0), true, html! { h2 { "Work Experience" } }))
            ol.timeline {
                @for (i, item) in work.iter().enumerate() {
                    li.timeline-entry {
                        (blur_fade(delay(6, i), false, html! {
                            div.timeline-date {
                                span.timeline-period {
                                    (period_label(item.start_date.as_deref(), item.end_date.as_deref()))
                                }
                                @if let Some(duration) = duration_label(item.start_date.as_deref(), item.end_date.as_deref(), ctx.today) {
                                    span.timeline-duration { (duration) }
                                }
                            }
                            span.timeline-dot.active[i == 0] aria-hidden="true" {}
                            (work_card(item, ctx))
                        }))
                    }
                }
            }
        }
    }
}

// ============================================================================
// Education
// ============================================================================

pub fn education_card(item: &Education, ctx: &RenderContext<'_>) -> Markup {
    let school = item.school();
    let body = html! {
        span.card-logo {
            (avatar(ctx.asset(item.logo_url()), school, &first_char(school), "avatar-logo"))
        }
        div.card-heading {
            h3 { (school) }
            @if let Some(degree) = &item.degree {
                p.card-subtitle { (degree) }
            }
        }
        span.card-period {
            (period_label(item.start_date.as_deref(), item.end_date.as_deref()))
        }
    };
    html! {
        @match item.url.as_deref().and_then(safe_href) {
            Some(url) => {
                a.resume-card href=(url) target="_blank" rel="noopener noreferrer" { (body) }
            }
            None => {
                div.resume-card { (body) }
            }
        }
    }
}

pub fn education_section(education: &[Education], ctx: &RenderContext<'_>) -> Markup {
    html! {
        section #education {
            (blur_fade(delay(7, 0), true, html! { h2 { "Education" } }))
            @for (i, item) in education.iter().enumerate() {
                (blur_fade(delay(8, i), true, education_card(item, ctx)))
            }
        }
    }
}

// ============================================================================
// Skills
// ============================================================================

fn planet(skill: &Skill, placement: &Placement, ctx: &RenderContext<'_>) -> Markup {
    let style = format!(
        "left: {:.2}%; top: {:.2}%; width: {:.1}px; height: {:.1}px; \
         --float-duration: {:.2}s; --float-delay: {:.2}s; --drift-x: {:.1}px; --drift-y: {:.1}px",
        placement.left,
        placement.top,
        placement.size,
        placement.size,
        placement.float.duration_secs,
        placement.float.delay_secs,
        placement.float.drift_x,
        placement.float.drift_y,
    );
    html! {
        div.planet style=(style) {
            span.planet-body {
                @match ctx.asset(skill.icon()) {
                    Some(icon) => {
                        img src=(icon) alt=(skill.name) loading="lazy";
                    }
                    None => {
                        span.planet-glyph aria-hidden="true" { (first_char(&skill.name)) }
                    }
                }
            }
            span.planet-label { (skill.name) }
        }
    }
}

fn star(star: &Star) -> Markup {
    let style = format!(
        "left: {:.2}%; top: {:.2}%; width: {:.2}px; height: {:.2}px; opacity: {:.2}; animation-delay: {:.2}s",
        star.left, star.top, star.size, star.size, star.opacity, star.delay_secs
    );
    html! { span.star style=(style) {} }
}

fn category_panel(panel: &CategoryLayout<'_>, ctx: &RenderContext<'_>) -> Markup {
    html! {
        div class={ "skill-category skill-" (panel.category.as_str()) } {
            h3.skill-category-label { (panel.category.label()) }
            div.skill-canvas style={ "--rows: " (panel.rows()) } {
                @for (skill, placement) in &panel.items {
                    (planet(skill, placement, ctx))
                }
            }
        }
    }
}

/// Floating categorized layout, or a flat badge list from the author's
/// free-form skills when no skill documents exist.
pub fn skills_section(
    skills: &[Skill],
    fallback: &[String],
    ctx: &RenderContext<'_>,
    rng: &mut impl Rng,
) -> Markup {
    let panels = layout::assign(skills, rng);
    let stars = if panels.is_empty() {
        Vec::new()
    } else {
        layout::starfield(layout::STAR_COUNT, rng)
    };
    html! {
        section #skills {
            (blur_fade(delay(9, 0), true, html! { h2 { "Skills" } }))
            @if panels.is_empty() {
                div.badges {
                    @for (i, name) in fallback.iter().enumerate() {
                        (blur_fade(delay(10, i), true, html! { span.badge { (name) } }))
                    }
                }
            } @else {
                div.skills-space {
                    div.starfield aria-hidden="true" {
                        @for s in &stars { (star(s)) }
                    }
                    div.skill-categories {
                        @for panel in &panels {
                            (category_panel(panel, ctx))
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Projects
// ============================================================================

fn link_glyph(kind: LinkKind) -> &'static str {
    match kind {
        LinkKind::Source => "⌥",
        LinkKind::Website => "◍",
        LinkKind::Demo => "▶",
        LinkKind::Docs => "❡",
        LinkKind::Default => "↗",
    }
}

pub fn link_badge(link: &ProjectLink) -> Markup {
    html! {
        @if let Some(url) = link.url() {
            a class={ "badge link-badge link-" (link.kind.as_str()) } href=(url) target="_blank" rel="noopener noreferrer" {
                span.link-icon aria-hidden="true" { (link_glyph(link.kind)) }
                (link.label())
            }
        }
    }
}

/// Video when present (image as poster), else image, else nothing.
fn cover_media(project: &Project, ctx: &RenderContext<'_>) -> Markup {
    let image = ctx.asset(project.image_url());
    html! {
        @if let Some(video) = ctx.video(project.video_url()) {
            video.cover src=(video) poster=[image] autoplay loop muted playsinline {}
        } @else if let Some(image) = image {
            img.cover src=(image) alt=(project.title()) loading="lazy";
        }
    }
}

pub fn project_card(project: &Project, dialog_id: &str, ctx: &RenderContext<'_>) -> Markup {
    html! {
        article.project-card data-dialog=(dialog_id) tabindex="0" role="button" aria-haspopup="dialog" {
            div.project-media {
                (cover_media(project, ctx))
                span.sr-only { (project.title()) }
            }
            div.project-body {
                h3.project-title { (project.title()) }
                @if !project.description.is_empty() {
                    div.prose.project-description { (rich_text::render(&project.description)) }
                }
                @if !project.technologies.is_empty() {
                    div.badges {
                        @for tag in &project.technologies {
                            span.badge.badge-tag { (tag) }
                        }
                    }
                }
            }
            @if project.usable_links().next().is_some() {
                footer.project-links {
                    @for link in project.usable_links() { (link_badge(link)) }
                }
            }
        }
    }
}

/// Status styling key. Unknown statuses look completed.
pub fn status_class(status: &str) -> &'static str {
    match status.trim().to_ascii_lowercase().as_str() {
        "in progress" | "in-progress" | "in_progress" => "in-progress",
        "planned" => "planned",
        _ => "completed",
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn info_card(label: &str, value: &str, color: &str) -> Markup {
    html! {
        div class={ "info-card info-" (color) } {
            span.info-label { (label) }
            span.info-value { (value) }
        }
    }
}

pub fn team_size_label(team_size: Option<u32>) -> String {
    match team_size {
        Some(n) if n > 0 => format!("{n} members"),
        _ => "Individual".to_string(),
    }
}

pub fn project_type_label(project_type: Option<&str>) -> String {
    project_type
        .map(capitalize)
        .unwrap_or_else(|| "Personal".to_string())
}

pub fn timeline_label(start: Option<&str>, end: Option<&str>) -> String {
    format!("{} - {}", short_month_year(start), short_month_year(end))
}

pub fn project_dialog(project: &Project, dialog_id: &str, ctx: &RenderContext<'_>) -> Markup {
    let title_id = format!("{dialog_id}-title");
    let technologies = &project.technologies;
    html! {
        dialog.project-dialog id=(dialog_id) aria-labelledby=(title_id) {
            div.dialog-progress aria-hidden="true" { div.dialog-progress-bar {} }
            header.dialog-hero {
                @if let Some(image) = ctx.asset(project.image_url()) {
                    div.dialog-hero-image {
                        img src=(image) alt=(project.title()) loading="lazy";
                    }
                }
                @if let Some(status) = project.status() {
                    span class={ "status-badge status-" (status_class(status)) } {
                        span.status-icon aria-hidden="true" {}
                        span.status-label { (status) }
                    }
                }
                div.dialog-hero-text {
                    h2 id=(title_id) { (project.title()) }
                    @if let Some(client) = project.client() {
                        p.dialog-client { (client) }
                    }
                }
            }
            div.dialog-scroll data-dialog-scroll {
                @if !project.description.is_empty() {
                    div.prose { (rich_text::render(&project.description)) }
                }
                section.dialog-section {
                    h3 { "Project Overview" }
                    div.info-grid {
                        (info_card("Role", project.role().unwrap_or("Not specified"), "blue"))
                        (info_card("Team Size", &team_size_label(project.team_size), "emerald"))
                        (info_card("Project Type", &project_type_label(project.project_type()), "violet"))
                        (info_card("Timeline", &timeline_label(project.start_date.as_deref(), project.end_date.as_deref()), "amber"))
                    }
                }
                @if let Some(outcome) = project.outcome() {
                    section.dialog-section {
                        h3 { "Key Achievements" }
                        div.outcome { p { (outcome) } }
                    }
                }
                @if !project.responsibilities.is_empty() {
                    section.dialog-section {
                        h3 { "Key Responsibilities" }
                        ol.responsibilities {
                            @for (i, item) in project.responsibilities.iter().enumerate() {
                                li {
                                    span.step { (i + 1) }
                                    p { (item) }
                                }
                            }
                        }
                    }
                }
                @if !technologies.is_empty() {
                    section.dialog-section data-tech-stack {
                        div.section-head {
                            h3 { "Technology Stack" }
                            @if technologies.len() > TECH_PREVIEW {
                                button.tech-toggle type="button" data-total=(technologies.len()) aria-expanded="false" {
                                    "Show All (" (technologies.len()) ")"
                                }
                            }
                        }
                        div.tech-list {
                            @for (i, tech) in technologies.iter().enumerate() {
                                span.badge.tech-badge.highlight[i < TECH_HIGHLIGHT].tech-extra[i >= TECH_PREVIEW] hidden[i >= TECH_PREVIEW] {
                                    (tech)
                                }
                            }
                        }
                    }
                }
            }
            footer.dialog-footer {
                div.dialog-links {
                    @for link in project.usable_links() { (link_badge(link)) }
                }
                form method="dialog" {
                    button.dialog-close type="submit" { "Close" }
                }
            }
        }
    }
}

pub fn projects_section(projects: &[Project], ctx: &RenderContext<'_>) -> Markup {
    html! {
        section #projects {
            (blur_fade(delay(11, 0), true, html! {
                div.section-intro {
                    span.pill { "My Projects" }
                    h2.display { "Check out my latest work" }
                    p.lead {
                        "I've worked on a variety of projects, from simple websites to complex applications. Here are a few of my favorites."
                    }
                }
            }))
            div.project-grid {
                @for (i, project) in projects.iter().enumerate() {
                    @let dialog_id = format!("project-{}", i + 1);
                    (blur_fade(delay(12, i), true, html! {
                        (project_card(project, &dialog_id, ctx))
                        (project_dialog(project, &dialog_id, ctx))
                    }))
                }
            }
        }
    }
}

// ============================================================================
// Contact, footer, page chrome
// ============================================================================

pub fn contact(author: &Author) -> Markup {
    html! {
        section #contact {
            (blur_fade(delay(16, 0), true, html! {
                div.section-intro {
                    span.pill { "Contact" }
                    h2.display { "Get in Touch" }
                    p.lead {
                        "Want to chat? Just shoot me a dm "
                        @match author.social.twitter() {
                            Some(twitter) => {
                                a href=(twitter) target="_blank" rel="noopener noreferrer" { "with a direct question on twitter" }
                            }
                            None => { "with a direct question" }
                        }
                        " and I'll respond whenever I can."
                    }
                }
            }))
        }
    }
}

pub fn footer(source_url: Option<&str>) -> Markup {
    html! {
        footer.site-footer {
            p {
                "Built with Rust and Sanity."
                @if let Some(url) = source_url.and_then(safe_href) {
                    " "
                    a href=(url) target="_blank" rel="noopener noreferrer" { "View source on GitHub" }
                }
            }
        }
    }
}

fn dock_item(href: &str, label: &str, glyph: &str, external: bool) -> Markup {
    html! {
        @if external {
            a.dock-item href=(href) target="_blank" rel="noopener noreferrer" aria-label=(label) title=(label) {
                span aria-hidden="true" { (glyph) }
            }
        } @else {
            a.dock-item href=(href) aria-label=(label) title=(label) {
                span aria-hidden="true" { (glyph) }
            }
        }
    }
}

/// Bottom dock: section anchors, then the author's contact links.
pub fn navbar(author: &Author) -> Markup {
    let social = &author.social;
    html! {
        nav.dock aria-label="Site" {
            (dock_item("/", "Home", "⌂", false))
            (dock_item("#skills", "Skills", "✧", false))
            (dock_item("#projects", "Projects", "▤", false))
            span.dock-separator role="separator" {}
            @if let Some(email) = social.email() {
                (dock_item(&format!("mailto:{email}"), "Contact", "✉", false))
            }
            @if let Some(github) = social.github() {
                (dock_item(github, "GitHub", "⌥", true))
            }
            @if let Some(linkedin) = social.linkedin() {
                (dock_item(linkedin, "LinkedIn", "in", true))
            }
        }
    }
}

pub fn draft_banner() -> Markup {
    html! {
        div.draft-banner {
            a href="/api/disable-draft" { "Disable Draft Mode" }
        }
    }
}

pub fn background_video() -> Markup {
    html! {
        div.video-background aria-hidden="true" {
            video src="/videos/galaxy.mp4" autoplay loop muted playsinline preload="auto" {}
        }
    }
}
