//! Integration tests for single document rendering

#![allow(deprecated)]

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

mod common;
use common::{tagrender_cmd, write_inputs, DATA, TEMPLATE};

#[test]
fn test_render_html_resolves_all_directives() {
    let temp = TempDir::new().unwrap();
    let (template, data) = write_inputs(temp.path(), TEMPLATE, DATA);
    let output = temp.path().join("cv-out.html");

    tagrender_cmd()
        .arg("render")
        .arg("-t")
        .arg(&template)
        .arg("-d")
        .arg(&data)
        .arg("-o")
        .arg(&output)
        .arg("-f")
        .arg("html")
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let html = fs::read_to_string(&output).unwrap();
    assert_eq!(
        html,
        "<html><head><title>CV</title></head><body>\
         <h1>Ada Lovelace</h1>\
         <span class=\"site\"><a href=\"https://ada.dev\">ada.dev</a></span>\
         <ul><li><b>Engineer</b> at <i>Analytical Engines</i></li>\
         <li><b>Maintainer</b> at <i>OpenLib</i></li></ul>\
         <section><p>Notes</p><p>Engines</p></section>\
         </body></html>"
    );
}

#[test]
fn test_render_with_tags_filters_data() {
    let temp = TempDir::new().unwrap();
    let (template, data) = write_inputs(temp.path(), TEMPLATE, DATA);
    let output = temp.path().join("work.html");

    tagrender_cmd()
        .arg("render")
        .arg("-t")
        .arg(&template)
        .arg("-d")
        .arg(&data)
        .arg("-o")
        .arg(&output)
        .arg("--format")
        .arg("html")
        .arg("--tags")
        .arg("WORK")
        .assert()
        .success();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("<h1>Ada Lovelace</h1>"));
    assert!(html.contains("Engineer"));
    assert!(!html.contains("Maintainer"));
    assert!(!html.contains("<section"));
}

#[test]
fn test_render_json_data() {
    let temp = TempDir::new().unwrap();
    let (template, data) = write_inputs(
        temp.path(),
        r#"<p value-of="skills"></p><p value-of="skills.1"></p>"#,
        r#"{"skills": ["Rust", "Go"]}"#,
    );
    let output = temp.path().join("out.html");

    tagrender_cmd()
        .args(["render", "-f", "html"])
        .arg("-t")
        .arg(&template)
        .arg("-d")
        .arg(&data)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let html = fs::read_to_string(&output).unwrap();
    assert_eq!(html, "<p>Rust, Go</p><p>Go</p>");
}

#[test]
fn test_render_default_output_path() {
    let temp = TempDir::new().unwrap();
    let (template, data) = write_inputs(temp.path(), TEMPLATE, DATA);

    tagrender_cmd()
        .current_dir(temp.path())
        .args(["render", "-f", "html"])
        .arg("-t")
        .arg(&template)
        .arg("-d")
        .arg(&data)
        .assert()
        .success();

    assert!(temp.path().join("output.html").exists());
}

#[test]
fn test_render_creates_output_directory() {
    let temp = TempDir::new().unwrap();
    let (template, data) = write_inputs(temp.path(), TEMPLATE, DATA);
    let output = temp.path().join("nested").join("dir").join("cv.html");

    tagrender_cmd()
        .args(["render", "-f", "html"])
        .arg("-t")
        .arg(&template)
        .arg("-d")
        .arg(&data)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert!(output.exists());
}

#[test]
fn test_render_no_data_for_tags() {
    let temp = TempDir::new().unwrap();
    let (template, data) = write_inputs(
        temp.path(),
        TEMPLATE,
        "tags: [private]\nexclusive: true\nname: Ada\n",
    );

    tagrender_cmd()
        .args(["render", "-f", "html", "--tags", "public"])
        .arg("-t")
        .arg(&template)
        .arg("-d")
        .arg(&data)
        .arg("-o")
        .arg(temp.path().join("out.html"))
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("No data found for tags: public"));

    assert!(!temp.path().join("out.html").exists());
}

#[test]
fn test_render_missing_template() {
    let temp = TempDir::new().unwrap();
    let (_, data) = write_inputs(temp.path(), TEMPLATE, DATA);

    tagrender_cmd()
        .args(["render", "-f", "html"])
        .arg("-t")
        .arg(temp.path().join("missing.html"))
        .arg("-d")
        .arg(&data)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Template file not found"));
}

#[test]
fn test_render_invalid_data() {
    let temp = TempDir::new().unwrap();
    let (template, data) = write_inputs(temp.path(), TEMPLATE, "{ broken: [");

    tagrender_cmd()
        .args(["render", "-f", "html"])
        .arg("-t")
        .arg(&template)
        .arg("-d")
        .arg(&data)
        .arg("-o")
        .arg(temp.path().join("out.html"))
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("JSON or YAML"));
}

#[test]
fn test_tags_and_iterate_conflict() {
    let temp = TempDir::new().unwrap();
    let (template, data) = write_inputs(temp.path(), TEMPLATE, DATA);

    tagrender_cmd()
        .args(["render", "--iterate", "--tags", "work"])
        .arg("-t")
        .arg(&template)
        .arg("-d")
        .arg(&data)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_pdf_with_missing_browser() {
    let temp = TempDir::new().unwrap();
    let (template, data) = write_inputs(temp.path(), TEMPLATE, DATA);

    tagrender_cmd()
        .env("TAGRENDER_BROWSER", "tagrender-no-such-browser-binary")
        .arg("render")
        .arg("-t")
        .arg(&template)
        .arg("-d")
        .arg(&data)
        .arg("-o")
        .arg(temp.path().join("cv.pdf"))
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("Failed to launch browser"));
}
