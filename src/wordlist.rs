//! Lazy wordlist streaming.
//!
//! A [`WordSource`] yields candidate paths one line at a time without ever
//! materializing the file in memory. An optional byte offset resumes a
//! previous run: the reader rewinds to the start of the line containing the
//! offset so no candidate is half-read.

use std::io::SeekFrom;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, BufReader, Lines};

/// Lazy line stream over a wordlist file.
pub struct WordSource {
    lines: Lines<BufReader<File>>,
}

impl WordSource {
    /// Open a wordlist, optionally resuming from a byte offset.
    ///
    /// When `offset > 0` the stream starts at the beginning of the line
    /// containing that offset (clamped to the file length).
    pub async fn open(path: impl AsRef<Path>, offset: u64) -> std::io::Result<Self> {
        let mut file = File::open(path).await?;

        if offset > 0 {
            let len = file.metadata().await?.len();
            let mut pos = offset.min(len);
            let mut byte = [0u8; 1];
            // Walk backwards until the previous newline (or file start).
            while pos > 0 {
                file.seek(SeekFrom::Start(pos - 1)).await?;
                file.read_exact(&mut byte).await?;
                if byte[0] == b'\n' {
                    break;
                }
                pos -= 1;
            }
            file.seek(SeekFrom::Start(pos)).await?;
        }

        Ok(Self {
            lines: BufReader::new(file).lines(),
        })
    }

    /// Next candidate path, or `None` at end of stream.
    pub async fn next(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "wordlist read failed, ending stream");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const TOKENS: &str = "foo\nbar\nboo\nmuu\neof\n";

    struct TempWordlist(PathBuf);

    impl TempWordlist {
        fn create(contents: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "dirprobe-wordlist-{}",
                uuid::Uuid::new_v4().simple()
            ));
            std::fs::write(&path, contents).unwrap();
            Self(path)
        }
    }

    impl Drop for TempWordlist {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    async fn collect(mut source: WordSource) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(line) = source.next().await {
            out.push(line);
        }
        out
    }

    #[tokio::test]
    async fn test_reads_all_lines_in_order() {
        let file = TempWordlist::create(TOKENS);
        let source = WordSource::open(&file.0, 0).await.unwrap();
        assert_eq!(collect(source).await, vec!["foo", "bar", "boo", "muu", "eof"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let result = WordSource::open("/nonexistent/dirprobe-wordlist", 0).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_offset_at_line_start_resumes_there() {
        // "foo\n" is 4 bytes; offset 4 lands exactly on "bar".
        let file = TempWordlist::create(TOKENS);
        let source = WordSource::open(&file.0, 4).await.unwrap();
        assert_eq!(collect(source).await, vec!["bar", "boo", "muu", "eof"]);
    }

    #[tokio::test]
    async fn test_offset_mid_line_rewinds_to_line_start() {
        // Offset 5 points inside "bar"; the full line is re-read.
        let file = TempWordlist::create(TOKENS);
        let source = WordSource::open(&file.0, 5).await.unwrap();
        assert_eq!(collect(source).await, vec!["bar", "boo", "muu", "eof"]);
    }

    #[tokio::test]
    async fn test_offset_inside_first_line_starts_at_file_start() {
        let file = TempWordlist::create(TOKENS);
        let source = WordSource::open(&file.0, 2).await.unwrap();
        assert_eq!(collect(source).await, vec!["foo", "bar", "boo", "muu", "eof"]);
    }

    #[tokio::test]
    async fn test_offset_past_end_yields_nothing() {
        let file = TempWordlist::create(TOKENS);
        let source = WordSource::open(&file.0, 10_000).await.unwrap();
        assert!(collect(source).await.is_empty());
    }
}
