//! Dump the token stream of a CSS file, or re-render it.
//!
//! Usage: `tokdump [--render] [FILE]` (reads stdin without a FILE).

use std::env;
use std::fs::File;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use csstok::{Renderer, TokenKind, Tokenizer};

fn main() -> io::Result<ExitCode> {
    let mut render = false;
    let mut path = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--render" => render = true,
            "--help" | "-h" => {
                println!("usage: tokdump [--render] [FILE]");
                return Ok(ExitCode::SUCCESS);
            }
            _ => path = Some(arg),
        }
    }

    let source: Box<dyn Read> = match &path {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin()),
    };
    let mut tz = Tokenizer::new(source);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut renderer = Renderer::new();
    loop {
        let token = tz.next();
        match token.kind {
            TokenKind::EOF => break,
            TokenKind::Error => {
                eprintln!("tokdump: {}", token.value_str());
                return Ok(ExitCode::FAILURE);
            }
            _ if render => renderer.write(&mut out, &token)?,
            _ => match &token.extra {
                Some(extra) => writeln!(out, "{} {:?} [{}]", token.kind, token.value_str(), extra)?,
                None => writeln!(out, "{} {:?}", token.kind, token.value_str())?,
            },
        }
    }
    if render {
        out.write_all(b"\n")?;
    }
    Ok(ExitCode::SUCCESS)
}
