//! End-to-end builds of the fixture course through the public API.
//!
//! Each test copies `fixtures/course/` to a temp directory, builds it, and
//! inspects the written site source tree.
//!
//! Run with: cargo test --test build_pipeline

use lessonsite::config::{self, Project};
use lessonsite::lesson::{LessonError, SkipReason};
use lessonsite::render::Renderer;
use lessonsite::site::{self, BuildError, BuildReport};
use lessonsite::trinket;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

fn copy_dir(src: &Path, dst: &Path) {
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.unwrap();
        let target = dst.join(entry.path().strip_prefix(src).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

fn fixture_course() -> TempDir {
    let tmp = TempDir::new().unwrap();
    copy_dir(
        &Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/course"),
        tmp.path(),
    );
    tmp
}

fn load(tmp: &TempDir) -> Project {
    config::load_project(tmp.path(), None).unwrap()
}

fn build(project: &Project) -> BuildReport {
    let renderer = Renderer::new(project.paths.templates.as_deref()).unwrap();
    site::build(project, &renderer).unwrap()
}

fn lessons_dir(project: &Project) -> PathBuf {
    project.paths.lesson_root.clone()
}

/// Every file under `dir` with its bytes, keyed by relative path.
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(dir)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            (
                e.path().strip_prefix(dir).unwrap().to_path_buf(),
                fs::read(e.path()).unwrap(),
            )
        })
        .collect()
}

#[test]
fn assignment_without_manifest_is_skipped() {
    let tmp = fixture_course();
    let project = load(&tmp);
    let report = build(&project);

    let lesson = &report.lessons[0];
    assert!(lesson.skipped.iter().any(|s| s.reference == "scratch" && s.reason == SkipReason::NoManifest));
    assert!(!lesson.assignments.iter().any(|a| a.reference == "scratch"));
    let names: Vec<String> = fs::read_dir(&lesson.dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert!(!names.iter().any(|n| n.contains("scratch")));
}

#[test]
fn untitled_assignment_writes_nothing() {
    let tmp = fixture_course();
    let project = load(&tmp);
    let report = build(&project);

    let lesson = &report.lessons[1];
    assert!(lesson.skipped.iter().any(|s| s.reference == "draft" && s.reason == SkipReason::NoTitle));
    let dirs: Vec<String> = fs::read_dir(&lesson.dir)
        .unwrap()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().unwrap().is_dir())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(dirs.len(), 2);
    assert!(!lessons_dir(&project).join("loops-and-turtles/draft").exists());
}

#[test]
fn titled_assignment_page_embeds_source() {
    let tmp = fixture_course();
    let project = load(&tmp);
    build(&project);

    let dir = lessons_dir(&project).join("loops-and-turtles/turtle-spiral");
    let page = fs::read_to_string(dir.join("index.md")).unwrap();
    let source = fs::read_to_string(dir.join("spiral.py")).unwrap();

    assert!(page.starts_with("---\ntitle: Turtle Spiral\n---\n"));
    assert!(page.contains("[spiral.py](./spiral.py)"));
    assert!(page.contains(&trinket::iframe_src(&source, "python")));
    assert!(page.contains("#code=import%20turtle%0A%0At%20%3D%20turtle.Turtle%28%29"));
    assert!(dir.join("goal.png").exists());
}

#[test]
fn assignment_without_trinket_text_copies_files_only() {
    let tmp = fixture_course();
    let project = load(&tmp);
    let report = build(&project);

    let dir = lessons_dir(&project).join("loops-and-turtles/flaming-ninja-star");
    assert!(!dir.join("index.md").exists());
    assert!(dir.join("ninja_star.py").exists());
    assert!(dir.join("star.gif").exists());

    let star = report.lessons[1]
        .assignments
        .iter()
        .find(|a| a.slug == "flaming-ninja-star")
        .unwrap();
    assert!(star.index.is_none());
}

#[test]
fn rebuild_is_byte_identical() {
    let tmp = fixture_course();
    let project = load(&tmp);
    let web_src = project.paths.web_src.clone();

    build(&project);
    let first = snapshot(&web_src);
    build(&project);
    let second = snapshot(&web_src);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn sidebar_matches_output_directories() {
    let tmp = fixture_course();
    let project = load(&tmp);
    let report = build(&project);
    let web_src = &project.paths.web_src;

    let lesson_entries: Vec<_> = report
        .sidebar
        .iter()
        .filter(|item| item.path().is_some_and(|p| p.starts_with("/lessons/")))
        .collect();
    assert_eq!(lesson_entries.len(), 2);

    let mut linked = 0;
    for item in &lesson_entries {
        for link in std::iter::once(*item).chain(item.children()) {
            let path = link.path().unwrap().trim_matches('/');
            assert!(web_src.join(path).is_dir(), "{path} is linked but missing");
            linked += 1;
        }
    }

    let tree = site::scan_output_tree(&project.paths.lesson_root).unwrap();
    let on_disk = tree.lessons.len() + tree.lessons.values().map(|a| a.len()).sum::<usize>();
    assert_eq!(linked, on_disk);
    assert!(report.discrepancies.is_empty());
}

#[test]
fn theme_config_keeps_other_settings() {
    let tmp = fixture_course();
    let project = load(&tmp);
    build(&project);

    let text = fs::read_to_string(&project.paths.theme_config).unwrap();
    let doc: serde_yaml_ng::Value = serde_yaml_ng::from_str(&text).unwrap();
    assert_eq!(doc["base"].as_str(), Some("/course/"));
    assert_eq!(doc["themeConfig"]["repo"].as_str(), Some("example/turtle-course"));
    assert!(!text.contains("/stale/"));
    assert_eq!(
        doc["themeConfig"]["sidebar"][2]["children"][0]["path"].as_str(),
        Some("/lessons/loops-and-turtles/turtle-spiral/")
    );
}

#[test]
fn top_pages_and_site_resources_copied() {
    let tmp = fixture_course();
    let project = load(&tmp);
    build(&project);

    assert!(project.paths.web_src.join("README.md").is_file());
    assert!(project.paths.public_assets.join("logo.png").is_file());
    assert!(lessons_dir(&project).join("loops-and-turtles/lesson2.png").is_file());
}

#[test]
fn unset_module_source_fails_before_writing() {
    let tmp = fixture_course();
    fs::remove_file(tmp.path().join("lessonsite.toml")).unwrap();
    let project = load(&tmp);
    let renderer = Renderer::new(None).unwrap();

    let err = site::build(&project, &renderer).unwrap_err();
    assert!(matches!(err, BuildError::Lesson(LessonError::ModuleSourceUnset)));
    assert!(!project.paths.lesson_root.exists());
    assert!(!project.paths.web_src.join("README.md").exists());
}

#[test]
fn module_source_override() {
    let tmp = fixture_course();
    fs::rename(tmp.path().join("modules"), tmp.path().join("elsewhere")).unwrap();
    let project = config::load_project(tmp.path(), Some(tmp.path().join("elsewhere"))).unwrap();

    let report = build(&project);
    assert_eq!(report.assignment_count(), 3);
}

#[test]
fn template_override_is_used() {
    let tmp = fixture_course();
    fs::create_dir_all(tmp.path().join("templates")).unwrap();
    fs::write(
        tmp.path().join("templates/assignment.md"),
        "# {{ title | upper }}\n\n{{ content }}",
    )
    .unwrap();
    fs::write(
        tmp.path().join("lessonsite.toml"),
        "module_source = \"modules\"\ntemplates = \"templates\"\n",
    )
    .unwrap();
    let project = load(&tmp);
    build(&project);

    let page = fs::read_to_string(
        lessons_dir(&project).join("getting-started/hello-world/index.md"),
    )
    .unwrap();
    assert!(page.starts_with("# HELLO, WORLD!\n\nRun the program"));
    assert!(page.contains("#code=print%28%22Hello%2C%20World%21%22%29"));
}
