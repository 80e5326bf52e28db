mod cli;

use std::fmt;
use std::io::Read;

use anyhow::Context;
use dns_deserializer::{Message, Section};
use tracing::{debug, error, info};

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse_args();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let raw = read_input(&args)?;
    let bytes = if args.hex { decode_hex(&raw)? } else { raw };
    debug!("Read {} message bytes", bytes.len());

    let message = match dns_deserializer::parse(&bytes) {
        Ok(message) => message,
        Err(e) => {
            error!(kind = ?e.kind(), "Failed to decode DNS message: {}", e);
            return Err(anyhow::Error::new(e).context("failed to decode DNS message"));
        }
    };
    info!(
        id = message.header().id,
        questions = message.questions().len(),
        answers = message.answers().len(),
        "Decoded DNS message"
    );

    print!("{}", Report(&message));
    Ok(())
}

fn read_input(args: &cli::Args) -> anyhow::Result<Vec<u8>> {
    match args.input() {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Decodes hex text, ignoring any whitespace between digits.
fn decode_hex(text: &[u8]) -> anyhow::Result<Vec<u8>> {
    let digits: Vec<u8> = text
        .iter()
        .copied()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();
    hex::decode(digits).context("input is not valid hex")
}

/// dig-style rendering of a parsed message
struct Report<'a>(&'a Message);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.0;
        let header = message.header();

        writeln!(
            f,
            ";; ->>HEADER<<- opcode: {}, status: {}, id: {}",
            header.opcode_name(),
            header.rcode_name(),
            header.id
        )?;

        let flags: Vec<&str> = [
            (header.qr, "qr"),
            (header.aa, "aa"),
            (header.tc, "tc"),
            (header.rd, "rd"),
            (header.ra, "ra"),
        ]
        .into_iter()
        .filter_map(|(set, flag)| set.then_some(flag))
        .collect();
        writeln!(
            f,
            ";; flags: {}; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
            flags.join(" "),
            header.qdcount,
            header.ancount,
            header.nscount,
            header.arcount
        )?;

        for section in Section::ALL {
            if header.count(section) == 0 {
                continue;
            }
            writeln!(
                f,
                "\n;; {} SECTION:",
                section.to_string().to_uppercase()
            )?;
            if section == Section::Question {
                for question in message.questions() {
                    writeln!(f, ";{}", question)?;
                }
            }
            for record in message.records(section) {
                writeln!(f, "{}", record)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex_ignores_whitespace() {
        let bytes = decode_hex(b"00 01\n0a\tff\r\n").unwrap();
        assert_eq!(bytes, vec![0x00, 0x01, 0x0a, 0xff]);
    }

    #[test]
    fn test_decode_hex_rejects_bad_input() {
        assert!(decode_hex(b"abc").is_err());
        assert!(decode_hex(b"zz").is_err());
    }

    #[test]
    fn test_report_layout() {
        let bytes = decode_hex(
            b"1234 8180 0001 0001 0000 0000
              03666f6f 00 0001 0001
              c00c 0001 0001 0000012c 0004 c0000201",
        )
        .unwrap();
        let message = dns_deserializer::parse(&bytes).unwrap();

        let report = Report(&message).to_string();
        assert_eq!(
            report,
            ";; ->>HEADER<<- opcode: QUERY, status: NOERROR, id: 4660\n\
             ;; flags: qr rd ra; QUERY: 1, ANSWER: 1, AUTHORITY: 0, ADDITIONAL: 0\n\
             \n;; QUESTION SECTION:\n\
             ;foo.\tIN\tA\n\
             \n;; ANSWER SECTION:\n\
             foo.\t300\tIN\tA\t192.0.2.1\n"
        );
    }
}
