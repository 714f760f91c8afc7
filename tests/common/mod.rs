#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

pub fn tagrender_cmd() -> Command {
    let mut cmd = Command::cargo_bin("tagrender").unwrap();
    cmd.env_remove("TAGRENDER_BROWSER");
    cmd.env_remove("RUST_LOG");
    cmd
}

pub const TEMPLATE: &str = r#"<html><head><title>CV</title></head><body><h1 value-of="name"></h1><span class="site" value-of="site"></span><ul><li repeat-for="jobs"><b value-of="jobs.title"></b> at <i value-of="jobs.company"></i></li></ul><section if-exists="talks"><p repeat-for="talks" value-of="talks"></p></section></body></html>"#;

pub const DATA: &str = r#"
name: Ada Lovelace
site:
  value: ada.dev
  url: https://ada.dev
jobs:
  - title: Engineer
    company: Analytical Engines
    tags: [work]
  - title: Maintainer
    company: OpenLib
    tags: [oss]
talks:
  value: Notes, Engines
  tags: [oss]
  exclusive: true
"#;

/// Write the template and data into `dir`, returning their paths
pub fn write_inputs(dir: &Path, template: &str, data: &str) -> (PathBuf, PathBuf) {
    let template_path = dir.join("cv.html");
    let data_path = dir.join("cv.yaml");
    fs::write(&template_path, template).unwrap();
    fs::write(&data_path, data).unwrap();
    (template_path, data_path)
}
