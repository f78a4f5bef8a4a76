//! Persisted run artifacts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::info;

use crate::pipeline::PipelineOutput;
use crate::types::{ReadabilityScores, Style};

/// Writes a run's corrections, outputs and scores, keyed by the input's base name.
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write every artifact for `output` and return the written paths.
    ///
    /// The corrections log is only written when there are corrections.
    pub async fn write(&self, document_name: &str, output: &PipelineOutput) -> Result<Vec<PathBuf>> {
        let base = base_name(document_name);
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", self.dir.display()))?;

        let mut written = Vec::new();

        if !output.corrections.is_empty() {
            let path = self.dir.join(format!("{base}_corrections.json"));
            let json = serde_json::to_string_pretty(&output.corrections)?;
            self.write_file(&path, json).await?;
            written.push(path);
        }

        let path = self.dir.join(format!("{base}_corrected.txt"));
        self.write_file(&path, output.corrected_document.clone()).await?;
        written.push(path);

        for (style, content) in &output.outputs {
            let path = self.dir.join(format!("{base}_{}.txt", style.key()));
            self.write_file(&path, content.clone()).await?;
            written.push(path);
        }

        let scores: BTreeMap<&str, &ReadabilityScores> = output
            .scores
            .iter()
            .map(|(style, scores): (&Style, _)| (style.key(), scores))
            .collect();
        let path = self.dir.join(format!("{base}_readability.json"));
        self.write_file(&path, serde_json::to_string_pretty(&scores)?).await?;
        written.push(path);

        info!(base = %base, files = written.len(), dir = %self.dir.display(), "Saved run artifacts");
        Ok(written)
    }

    async fn write_file(&self, path: &Path, contents: String) -> Result<()> {
        fs::write(path, contents)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// File stem of a document name, e.g. `essay` for `uploads/essay.txt`.
pub fn base_name(document_name: &str) -> String {
    Path::new(document_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CorrectionRecord, ScoreValue};
    use pretty_assertions::assert_eq;

    fn output(corrections: Vec<CorrectionRecord>) -> PipelineOutput {
        let mut output = PipelineOutput {
            corrected_document: "The cat sat.".to_string(),
            corrections,
            ..Default::default()
        };
        output.outputs.insert(Style::Academic, "The feline was seated.".to_string());
        output.outputs.insert(Style::Children, "A kitty sat down.".to_string());
        let mut scores = ReadabilityScores::new();
        scores.insert("cefr_estimate".to_string(), ScoreValue::Label("B1".to_string()));
        output.scores.insert(Style::Academic, scores);
        output
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("data/input_texts/makale.txt"), "makale");
        assert_eq!(base_name("essay"), "essay");
        assert_eq!(base_name(""), "document");
    }

    #[tokio::test]
    async fn test_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path().join("outputs"));
        let record = CorrectionRecord::new("Teh cat sat.", "The cat sat.", Some(1));

        let written = writer.write("example.txt", &output(vec![record])).await.unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "example_corrections.json",
                "example_corrected.txt",
                "example_academic.txt",
                "example_children.txt",
                "example_readability.json",
            ]
        );

        let corrections: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(corrections[0]["num_issues"], 1);

        let scores: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&written[4]).unwrap()).unwrap();
        assert_eq!(scores["academic"]["cefr_estimate"], "B1");
    }

    #[tokio::test]
    async fn test_no_corrections_log_without_corrections() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());
        let written = writer.write("clean.txt", &output(vec![])).await.unwrap();
        assert!(!dir.path().join("clean_corrections.json").exists());
        assert_eq!(written.len(), 4);
    }
}
