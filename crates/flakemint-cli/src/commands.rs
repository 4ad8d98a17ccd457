use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;
use std::thread;

use anyhow::{Context, anyhow};
use flakemint::{
    BitLayout, FlakeParts, GeneratorConfig, LockFlakeGenerator, SystemClock, TOKEN_LEN, Token,
};

use crate::config::Format;

/// Issues `count` ids from each of `threads` threads sharing one generator and
/// writes one line per id to `out`.
///
/// With more than one thread every line is prefixed by the issuing thread's
/// name so interleaving is visible.
pub fn generate<W>(
    config: &GeneratorConfig,
    count: usize,
    threads: usize,
    format: Format,
    out: W,
) -> anyhow::Result<()>
where
    W: Write + Send,
{
    let generator = LockFlakeGenerator::new(config, SystemClock)?;
    tracing::info!(layout = %generator.layout(), count, threads, "issuing ids");

    let out = Mutex::new(out);
    if threads == 1 {
        issue(&generator, count, format, None, &out)?;
    } else {
        thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|i| {
                    let generator = &generator;
                    let out = &out;
                    thread::Builder::new()
                        .name(format!("thread-{i}"))
                        .spawn_scoped(s, move || {
                            let name = format!("thread-{i}");
                            issue(generator, count, format, Some(name.as_str()), out)
                        })
                })
                .collect::<Result<_, _>>()
                .context("failed to spawn worker thread")?;

            for handle in handles {
                handle
                    .join()
                    .map_err(|_| anyhow!("worker thread panicked"))??;
            }
            anyhow::Ok(())
        })?;
    }

    out.into_inner()
        .map_err(|_| anyhow!("output lock poisoned"))?
        .flush()
        .context("failed to flush output")
}

fn issue<W: Write>(
    generator: &LockFlakeGenerator<SystemClock>,
    count: usize,
    format: Format,
    prefix: Option<&str>,
    out: &Mutex<W>,
) -> anyhow::Result<()> {
    for _ in 0..count {
        let id = generator.next_id()?;
        let mut out = out.lock().map_err(|_| anyhow!("output lock poisoned"))?;
        write_id(&mut *out, id, format, prefix)?;
    }
    Ok(())
}

fn write_id(
    out: &mut impl Write,
    id: u64,
    format: Format,
    prefix: Option<&str>,
) -> io::Result<()> {
    if let Some(prefix) = prefix {
        write!(out, "{prefix}: ")?;
    }
    match format {
        Format::Token => writeln!(out, "{}", Token::from_id(id)),
        Format::Int => writeln!(out, "{id}"),
    }
}

/// The decoded view of one id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub id: u64,
    pub token: Token,
    pub parts: FlakeParts,
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id:          {}", self.id)?;
        writeln!(f, "token:       {}", self.token)?;
        writeln!(f, "timestamp:   {} ms", self.parts.timestamp_ms)?;
        writeln!(f, "instance_id: {}", self.parts.instance_id)?;
        write!(f, "sequence:    {}", self.parts.sequence)
    }
}

/// Decodes `value` against `layout`. Values exactly [`TOKEN_LEN`] characters
/// long are read as tokens; anything else as a decimal id.
pub fn inspect(layout: &BitLayout, value: &str) -> anyhow::Result<Inspection> {
    let value = value.trim();
    let id = if value.len() == TOKEN_LEN {
        value
            .parse::<Token>()
            .with_context(|| format!("`{value}` is not a valid token"))?
            .to_id()
    } else {
        value
            .parse::<u64>()
            .with_context(|| format!("`{value}` is neither a token nor a decimal id"))?
    };

    Ok(Inspection {
        id,
        token: Token::from_id(id),
        parts: layout.decompose(id),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;

    fn layout() -> BitLayout {
        GeneratorConfig::new(0).layout().unwrap()
    }

    #[test]
    fn generate_single_thread_writes_tokens() {
        let mut buf = Vec::new();
        generate(&GeneratorConfig::new(5), 100, 1, Format::Token, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let tokens: Vec<Token> = text.lines().map(|line| line.parse().unwrap()).collect();
        assert_eq!(tokens.len(), 100);
        assert!(tokens.windows(2).all(|w| w[0] < w[1]));
        assert!(
            tokens
                .iter()
                .all(|t| layout().decompose(t.to_id()).instance_id == 5)
        );
    }

    #[test]
    fn generate_threads_share_one_generator() {
        const THREADS: usize = 4;
        const COUNT: usize = 500;

        let mut buf = Vec::new();
        generate(&GeneratorConfig::new(9), COUNT, THREADS, Format::Int, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut per_thread: HashMap<&str, Vec<u64>> = HashMap::new();
        for line in text.lines() {
            let (name, id) = line.split_once(": ").unwrap();
            per_thread.entry(name).or_default().push(id.parse().unwrap());
        }

        assert_eq!(text.lines().count(), THREADS * COUNT);
        assert_eq!(per_thread.len(), THREADS);
        let mut seen = HashSet::new();
        for i in 0..THREADS {
            let ids = &per_thread[format!("thread-{i}").as_str()];
            assert_eq!(ids.len(), COUNT);
            assert!(ids.windows(2).all(|w| w[0] < w[1]));
            seen.extend(ids.iter().copied());
        }
        assert_eq!(seen.len(), THREADS * COUNT);
    }

    #[test]
    fn generate_rejects_invalid_config() {
        let config = GeneratorConfig::new(0).with_sequence_bits(13);
        let mut buf = Vec::new();
        assert!(generate(&config, 1, 1, Format::Int, &mut buf).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn inspect_decimal() {
        let id = (1_700_000_000_000_u64 << 22) | (7 << 12) | 3;
        let inspection = inspect(&layout(), &id.to_string()).unwrap();
        assert_eq!(inspection.id, id);
        assert_eq!(inspection.parts.timestamp_ms, 1_700_000_000_000);
        assert_eq!(inspection.parts.instance_id, 7);
        assert_eq!(inspection.parts.sequence, 3);
    }

    #[test]
    fn inspect_token_matches_decimal() {
        let id = (1_700_000_000_000_u64 << 22) | (1 << 12);
        let token = Token::from_id(id).to_string();
        let by_token = inspect(&layout(), &token).unwrap();
        let by_id = inspect(&layout(), &id.to_string()).unwrap();
        assert_eq!(by_token, by_id);
        assert_eq!(by_token.token, token.as_str());
    }

    #[test]
    fn inspect_rejects_garbage() {
        assert!(inspect(&layout(), "not-an-id").is_err());
        assert!(inspect(&layout(), "WWWWWWWWWWWWW").is_err());
        assert!(inspect(&layout(), "18446744073709551616").is_err());
    }

    #[test]
    fn display_lists_fields() {
        let text = inspect(&layout(), "0").unwrap().to_string();
        assert_eq!(
            text,
            "id:          0\n\
             token:       0000000000000\n\
             timestamp:   0 ms\n\
             instance_id: 0\n\
             sequence:    0"
        );
    }
}
