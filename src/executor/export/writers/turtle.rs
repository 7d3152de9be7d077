//! Turtle-style triple block writer
//!
//! One block per subject: the subject on its own line, then one
//! tab-indented `predicate<TAB>object<TAB>` line per object. Every line
//! ends with `;` except the one for the last object of the subject's last
//! predicate, which ends with `.` instead.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::error::{Result, SerializationError};

use super::super::batch::TripleBatch;
use super::BatchWriter;

const WRITE_BUFFER_SIZE: usize = 1024 * 1024;

/// Writer producing the Turtle-like triple block format
pub struct TurtleWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    written: usize,
}

impl TurtleWriter {
    /// Create the output file, truncating an existing one.
    ///
    /// Missing parent directories are created.
    pub async fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(SerializationError::Io)?;
            }
        }

        let file = File::create(path).await.map_err(SerializationError::Io)?;

        debug!(path = %path.display(), "created export file");

        Ok(Self {
            writer: BufWriter::with_capacity(WRITE_BUFFER_SIZE, file),
            path: path.to_path_buf(),
            written: 0,
        })
    }
}

/// Render one batch into the triple block text format
pub(crate) fn render_batch(batch: &TripleBatch) -> String {
    let mut out = String::new();

    for (subject, predicates) in batch.subjects() {
        out.push_str(subject);

        let total: usize = predicates.values().map(Vec::len).sum();
        let mut rendered = 0;

        for (predicate, objects) in predicates {
            for object in objects {
                rendered += 1;
                out.push_str("\n\t");
                out.push_str(predicate);
                out.push('\t');
                out.push_str(object);
                out.push('\t');

                if rendered < total {
                    out.push(';');
                }
            }
        }

        out.push_str(".\n");
    }

    out
}

#[async_trait]
impl BatchWriter for TurtleWriter {
    async fn write_batch(&mut self, batch: &TripleBatch) -> Result<usize> {
        let rendered = render_batch(batch);

        self.writer
            .write_all(rendered.as_bytes())
            .await
            .map_err(SerializationError::Io)?;

        self.written += batch.len();
        debug!(triples = batch.len(), total = self.written, "wrote batch");

        Ok(batch.len())
    }

    async fn finalize(&mut self) -> Result<()> {
        self.writer.flush().await.map_err(SerializationError::Io)?;

        debug!(
            path = %self.path.display(),
            triples = self.written,
            "finalized export file"
        );

        Ok(())
    }

    async fn file_size(&self) -> Result<u64> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(SerializationError::Io)?;
        Ok(metadata.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_subject() {
        let mut batch = TripleBatch::new();
        batch.insert("abc", "xyz", "one");
        batch.insert("abc", "xyz", "two");
        batch.insert("abc", "xyz", "three");

        assert_eq!(
            render_batch(&batch),
            "abc\n\txyz\tone\t;\n\txyz\ttwo\t;\n\txyz\tthree\t.\n"
        );
    }

    #[test]
    fn test_render_terminator_spans_predicates() {
        let mut batch = TripleBatch::new();
        batch.insert("s", "a", "1");
        batch.insert("s", "b", "2");

        // only the very last object of the subject takes the period
        assert_eq!(render_batch(&batch), "s\n\ta\t1\t;\n\tb\t2\t.\n");
    }

    #[test]
    fn test_render_multiple_subjects() {
        let mut batch = TripleBatch::new();
        batch.insert("s1", "p", "o");
        batch.insert("s2", "p", "o");

        assert_eq!(render_batch(&batch), "s1\n\tp\to\t.\ns2\n\tp\to\t.\n");
    }

    #[test]
    fn test_render_round_trip() {
        let mut batch = TripleBatch::new();
        batch.insert("s1", "p1", "o1");
        batch.insert("s1", "p1", "o2");
        batch.insert("s1", "p2", "o3");
        batch.insert("s2", "p1", "o4");

        let rendered = render_batch(&batch);
        let mut recovered: Vec<(String, String, String)> = Vec::new();
        let mut subject = String::new();

        for line in rendered.lines() {
            if let Some(rest) = line.strip_prefix('\t') {
                let fields: Vec<&str> = rest.split('\t').collect();
                assert_eq!(fields.len(), 3);
                assert!(fields[2] == ";" || fields[2] == ".");
                recovered.push((
                    subject.clone(),
                    fields[0].to_string(),
                    fields[1].to_string(),
                ));
            } else {
                subject = line.to_string();
            }
        }

        let expected = vec![
            ("s1", "p1", "o1"),
            ("s1", "p1", "o2"),
            ("s1", "p2", "o3"),
            ("s2", "p1", "o4"),
        ];
        let expected: Vec<(String, String, String)> = expected
            .into_iter()
            .map(|(s, p, o)| (s.to_string(), p.to_string(), o.to_string()))
            .collect();
        assert_eq!(recovered, expected);
    }

    #[tokio::test]
    async fn test_writer_appends_batches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.ttl");

        let mut writer = TurtleWriter::create(&path).await.unwrap();

        let mut first = TripleBatch::new();
        first.insert("a", "b", "c");
        let mut second = TripleBatch::new();
        second.insert("d", "e", "f");

        assert_eq!(writer.write_batch(&first).await.unwrap(), 1);
        assert_eq!(writer.write_batch(&second).await.unwrap(), 1);
        writer.finalize().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "a\n\tb\tc\t.\nd\n\te\tf\t.\n");
        assert_eq!(writer.file_size().await.unwrap(), contents.len() as u64);
    }

    #[tokio::test]
    async fn test_writer_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.ttl");
        std::fs::write(&path, "stale contents").unwrap();

        let mut writer = TurtleWriter::create(&path).await.unwrap();
        writer.finalize().await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn test_writer_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deep/export.ttl");

        let mut writer = TurtleWriter::create(&path).await.unwrap();
        writer.finalize().await.unwrap();

        assert!(path.exists());
    }
}
