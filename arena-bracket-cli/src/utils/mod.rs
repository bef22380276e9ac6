use std::fmt::Display;
use std::io::{self, Write};
use std::str::FromStr;

#[cfg(test)]
use std::{
    env, fs,
    path::PathBuf,
    process,
    sync::atomic::{AtomicUsize, Ordering},
};

use serde::Serialize;

/// Writes `value` as pretty printed JSON to stdout.
pub fn print_json<T>(value: &T) -> Result<(), serde_json::Error>
where
    T: ?Sized + Serialize,
{
    let mut writer = io::stdout().lock();
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer).map_err(serde_json::Error::io)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Prompt<'a, T>
where
    T: FromStr,
    T::Err: Display,
{
    value: Option<T>,
    msg: &'a str,
}

impl<'a, T> Prompt<'a, T>
where
    T: FromStr,
    T::Err: Display,
{
    #[inline]
    pub fn new(msg: &'a str) -> Self {
        Self { value: None, msg }
    }

    /// Uses `value` instead of prompting if it is `Some`.
    #[inline]
    pub fn or(mut self, value: Option<T>) -> Self {
        self.value = value;
        self
    }

    pub fn read(&mut self) -> io::Result<Result<T, T::Err>> {
        {
            // Prompts go to stderr, stdout only carries JSON.
            let mut writer = io::stderr();
            writer.write_all(self.msg.as_bytes())?;
            writer.write_all(b": ")?;
            writer.flush()?;
        }

        let mut string = String::new();
        if io::stdin().read_line(&mut string)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no input for {}", self.msg),
            ));
        }

        Ok(T::from_str(string.trim_end_matches(['\r', '\n'])))
    }

    /// Read until a valid element is input.
    pub fn read_valid(&mut self) -> io::Result<T> {
        if let Some(value) = self.value.take() {
            return Ok(value);
        }

        loop {
            match self.read()? {
                Ok(val) => return Ok(val),
                Err(err) => {
                    eprintln!("Failed to parse input: {}", err)
                }
            }
        }
    }
}

/// A unique directory below the system temp directory, removed when dropped.
#[cfg(test)]
#[derive(Debug)]
pub struct TempDir(pub PathBuf);

#[cfg(test)]
impl TempDir {
    pub fn new(prefix: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        let path = env::temp_dir().join(format!(
            "arena-bracket-{}-{}-{}",
            prefix,
            process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));

        Self(path)
    }
}

#[cfg(test)]
impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}
