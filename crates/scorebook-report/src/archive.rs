//! Archive writer: packs named in-memory buffers into one zip.

use std::io::{Cursor, Write as _};

use zip::{CompressionMethod, ZipWriter, write::FileOptions};

use crate::Result;

/// Write every `(name, bytes)` entry into a deflated zip held in memory.
pub fn write_archive<N, B>(entries: &[(N, B)]) -> Result<Vec<u8>>
where
  N: AsRef<str>,
  B: AsRef<[u8]>,
{
  let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
  let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

  for (name, bytes) in entries {
    zip.start_file(name.as_ref(), opts)?;
    zip.write_all(bytes.as_ref())?;
  }

  Ok(zip.finish()?.into_inner())
}
