//! Streaming decoders (Bytes -> JSON Value)

use crate::pipeline::Decoder;
use crate::BoxStream;
use bytes::Bytes;
use futures::{stream, StreamExt};
use serde_json::Value;
use tracing::trace;

/// SSE decoder:
/// - splits by delimiter (default "\n\n")
/// - strips `prefix` (default "data: ")
/// - stops on `done_signal` (default "[DONE]")
pub struct SseDecoder {
    delimiter: String,
    prefix: String,
    done_signal: String,
}

impl SseDecoder {
    pub fn new(
        delimiter: Option<String>,
        prefix: Option<String>,
        done_signal: Option<String>,
    ) -> Self {
        Self {
            delimiter: delimiter.unwrap_or_else(|| "\n\n".to_string()),
            prefix: prefix.unwrap_or_else(|| "data: ".to_string()),
            done_signal: done_signal.unwrap_or_else(|| "[DONE]".to_string()),
        }
    }
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

#[async_trait::async_trait]
impl Decoder for SseDecoder {
    async fn decode_stream(&self, input: BoxStream<'static, Bytes>) -> BoxStream<'static, Value> {
        let delimiter = self.delimiter.clone();
        let prefix = self.prefix.clone();
        let done_signal = self.done_signal.clone();

        // Buffer raw bytes; a frame is only decoded as UTF-8 once it is complete.
        let stream = stream::unfold(
            (input, Vec::<u8>::new(), false, false),
            move |(mut input, mut buf, mut held_cr, done)| {
                let delimiter = delimiter.clone();
                let prefix = prefix.clone();
                let done_signal = done_signal.clone();
                async move {
                    if done {
                        return None;
                    }

                    let is_done = |s: &str| -> bool {
                        let t = s.trim();
                        t == done_signal
                            || t.strip_prefix("data:").map(str::trim) == Some(done_signal.as_str())
                    };

                    let parse_payload = |raw: &str| -> Option<Value> {
                        // A frame may hold `event:`/`id:` lines next to `data:`.
                        let mut data = String::new();
                        for line in raw.lines() {
                            let line = line.trim_end_matches('\r');
                            if line.starts_with(':') {
                                continue;
                            }
                            let payload = if let Some(p) = line.strip_prefix(prefix.as_str()) {
                                p
                            } else if let Some(p) = line.strip_prefix("data:") {
                                p.trim_start()
                            } else if line.contains(':') && !line.trim_start().starts_with('{') {
                                continue;
                            } else {
                                line
                            };
                            data.push_str(payload);
                        }
                        let data = data.trim();
                        if data.is_empty() {
                            return None;
                        }
                        match serde_json::from_str(data) {
                            Ok(v) => Some(v),
                            Err(e) => {
                                trace!(error = %e, "skipping non-JSON SSE frame");
                                None
                            }
                        }
                    };

                    loop {
                        if let Some(idx) = find_bytes(&buf, delimiter.as_bytes()) {
                            let frame = String::from_utf8_lossy(&buf[..idx]).into_owned();
                            buf.drain(..idx + delimiter.len());

                            if is_done(&frame) {
                                return None;
                            }
                            if let Some(v) = parse_payload(&frame) {
                                return Some((Ok(v), (input, buf, held_cr, false)));
                            }
                            continue;
                        }

                        match input.next().await {
                            Some(Ok(bytes)) => append_normalized(&mut buf, &mut held_cr, &bytes),
                            Some(Err(e)) => {
                                return Some((Err(e), (input, buf, held_cr, true)));
                            }
                            None => {
                                // EOF: try the trailing frame once
                                if held_cr {
                                    buf.push(b'\r');
                                }
                                let tail = std::mem::take(&mut buf);
                                let tail = String::from_utf8_lossy(&tail).into_owned();
                                if is_done(&tail) {
                                    return None;
                                }
                                return parse_payload(&tail)
                                    .map(|v| (Ok(v), (input, buf, false, true)));
                            }
                        }
                    }
                }
            },
        );

        Box::pin(stream)
    }
}

/// Append one network read, folding CRLF into LF.
///
/// A trailing CR is held back until the next read shows whether it pairs with LF.
fn append_normalized(buf: &mut Vec<u8>, held_cr: &mut bool, bytes: &[u8]) {
    for &b in bytes {
        if std::mem::take(held_cr) && b != b'\n' {
            buf.push(b'\r');
        }
        if b == b'\r' {
            *held_cr = true;
        } else {
            buf.push(b);
        }
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes_stream(chunks: Vec<&'static str>) -> BoxStream<'static, Bytes> {
        Box::pin(stream::iter(chunks).map(|s| Ok(Bytes::from(s))))
    }

    #[tokio::test]
    async fn decodes_frames_split_across_chunks() {
        let input = bytes_stream(vec![
            "data: {\"a\":",
            "1}\n\ndata: {\"a\":2}\n",
            "\ndata: [DONE]\n\n",
            "data: {\"a\":3}\n\n",
        ]);
        let values: Vec<Value> = SseDecoder::default()
            .decode_stream(input)
            .await
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(values, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[tokio::test]
    async fn skips_comments_and_event_lines() {
        let input = bytes_stream(vec![
            ": keep-alive\n\n",
            "event: message\r\ndata: {\"b\":true}\r\n\r\n",
            "data: not json\n\n",
            "data: {\"c\":1}",
        ]);
        let values: Vec<Value> = SseDecoder::default()
            .decode_stream(input)
            .await
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(values, vec![json!({"b": true}), json!({"c": 1})]);
    }

    #[tokio::test]
    async fn upstream_error_ends_the_stream() {
        let input: BoxStream<'static, Bytes> = Box::pin(stream::iter(vec![
            Ok(Bytes::from("data: {\"a\":1}\n\n")),
            Err(crate::Error::configuration("connection reset")),
            Ok(Bytes::from("data: {\"a\":2}\n\n")),
        ]));
        let results: Vec<_> = SseDecoder::default().decode_stream(input).await.collect().await;
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    fn raw_stream(chunks: Vec<Vec<u8>>) -> BoxStream<'static, Bytes> {
        Box::pin(stream::iter(chunks).map(|c| Ok(Bytes::from(c))))
    }

    #[tokio::test]
    async fn multibyte_char_split_across_reads() {
        let frame = "data: {\"t\":\"caf\u{e9} \u{1f600}\"}\n\n".as_bytes().to_vec();
        // Cut inside the two-byte 'é' and inside the four-byte emoji.
        let e_acute = frame.iter().position(|&b| b == 0xC3).unwrap();
        let emoji = frame.iter().position(|&b| b == 0xF0).unwrap();
        let input = raw_stream(vec![
            frame[..e_acute + 1].to_vec(),
            frame[e_acute + 1..emoji + 2].to_vec(),
            frame[emoji + 2..].to_vec(),
        ]);
        let values: Vec<Value> = SseDecoder::default()
            .decode_stream(input)
            .await
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(values, vec![json!({"t": "caf\u{e9} \u{1f600}"})]);
    }

    #[tokio::test]
    async fn crlf_split_across_reads() {
        let input = bytes_stream(vec![
            "data: {\"n\":1}\r\n\r",
            "\ndata: {\"n\":2}\r",
            "\n\r\n",
        ]);
        let values: Vec<Value> = SseDecoder::default()
            .decode_stream(input)
            .await
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(values, vec![json!({"n": 1}), json!({"n": 2})]);
    }

    #[test]
    fn lone_carriage_returns_survive_normalization() {
        let mut buf = Vec::new();
        let mut held = false;
        append_normalized(&mut buf, &mut held, b"a\r\r");
        append_normalized(&mut buf, &mut held, b"\nb\rc");
        assert_eq!(buf, b"a\r\nb\rc");
        assert!(!held);
    }
}
