//! Readers for the files the `region` tool works from: the tab-separated
//! "prepared CDS" annotation, and flat lists of transcript ids.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Error, bail};
use tracing::{Level, event};

use crate::data::coords::TranscriptCoords;
use crate::err_opt_ext::{HashMapExt, SliceIndexExt};

/// Column layout of a prepared CDS record (0-based).
pub mod columns {
    pub const GENE_ID: usize = 0;
    pub const TRANSCRIPT_ID: usize = 2;
    pub const STATUS: usize = 3;
    pub const TRANSCRIPT_LENGTH: usize = 8;
    pub const CDS_START: usize = 9;
    pub const CDS_END: usize = 10;
    pub const FLAG: usize = 11;
}

const COMPOSITE: &str = "composite";
const FLAG_PASS: &str = "*";
const ID_JOIN: &str = "|";

enum LineReader {
    Plain(BufReader<File>),
    #[cfg(feature = "gz")]
    Gz(BufReader<flate2::bufread::MultiGzDecoder<BufReader<File>>>),
}

impl LineReader {
    fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = BufReader::new(File::open(path.as_ref())?);
        if let Some(true) = path.as_ref().extension().map(|s| s == "gz") {
            #[cfg(feature = "gz")]
            {
                let decoder = flate2::bufread::MultiGzDecoder::new(file);
                return Ok(LineReader::Gz(BufReader::new(decoder)));
            }
            #[cfg(not(feature = "gz"))]
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "gzip input needs the `gz` feature",
            ));
        }
        Ok(LineReader::Plain(file))
    }
}

impl io::Read for LineReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            LineReader::Plain(r) => r.read(buf),
            #[cfg(feature = "gz")]
            LineReader::Gz(r) => r.read(buf),
        }
    }
}

impl BufRead for LineReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            LineReader::Plain(r) => r.fill_buf(),
            #[cfg(feature = "gz")]
            LineReader::Gz(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            LineReader::Plain(r) => r.consume(amt),
            #[cfg(feature = "gz")]
            LineReader::Gz(r) => r.consume(amt),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationOptions {
    /// Drop records whose flag column is not `*`.
    pub use_flag: bool,
    /// Columns joined with `|` to form the transcript key.
    pub id_columns: Vec<usize>,
    /// Trim a CDS whose length is not a multiple of 3 at its 3' end.
    pub clip_to_codons: bool,
}

impl Default for AnnotationOptions {
    fn default() -> Self {
        Self {
            use_flag: false,
            id_columns: vec![columns::TRANSCRIPT_ID],
            clip_to_codons: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub gene_id: String,
    pub transcript_id: String,
    pub coords: TranscriptCoords,
}

impl AnnotationRecord {
    /// Parses one line. `Ok(None)` means the record is valid but filtered out.
    pub fn parse_line(line: &str, opts: &AnnotationOptions) -> Result<Option<Self>, Error> {
        let fields = line.split('\t').collect::<Vec<_>>();

        if *fields.get_or_column_err(columns::STATUS)? == COMPOSITE {
            return Ok(None);
        }
        if opts.use_flag && *fields.get_or_column_err(columns::FLAG)? != FLAG_PASS {
            return Ok(None);
        }

        let transcript_id = opts
            .id_columns
            .iter()
            .map(|&i| fields.get_or_column_err(i).copied())
            .collect::<Result<Vec<_>, _>>()?
            .join(ID_JOIN);
        let gene_id = fields.get_or_column_err(columns::GENE_ID)?.to_string();

        let int_at = |col: usize| -> Result<i64, Error> {
            let s = fields.get_or_column_err(col)?;
            s.parse::<i64>()
                .with_context(|| format!("column {col} is not an integer: '{s}'"))
        };
        let length = int_at(columns::TRANSCRIPT_LENGTH)?;
        let start = int_at(columns::CDS_START)?;
        let mut end = int_at(columns::CDS_END)?;

        if !(0 <= start && start <= end && end <= length) {
            bail!("inconsistent CDS {start}..{end} on a transcript of length {length}");
        }

        if opts.clip_to_codons {
            let partial = (end - start) % 3;
            if partial != 0 {
                event!(
                    Level::DEBUG,
                    "{transcript_id}: clipping {partial} nt of an incomplete codon at the CDS end"
                );
                end -= partial;
            }
        }

        Ok(Some(Self {
            gene_id,
            transcript_id,
            coords: TranscriptCoords::cds(start, end, length),
        }))
    }
}

/// Transcript id -> coordinates, iterated in file order.
#[derive(Debug, Default, Clone)]
pub struct TranscriptDb {
    records: Vec<AnnotationRecord>,
    index: HashMap<String, usize>,
}

impl TranscriptDb {
    pub fn from_path(path: impl AsRef<Path>, opts: &AnnotationOptions) -> Result<Self, Error> {
        let path = path.as_ref();
        let reader = LineReader::from_path(path)
            .with_context(|| format!("Could not read the CDS info: {}", path.display()))?;
        let db = Self::from_reader(reader, opts)
            .with_context(|| format!("Could not parse the CDS info: {}", path.display()))?;

        event!(
            Level::INFO,
            "loaded {} transcripts from {}",
            db.len(),
            path.display()
        );

        Ok(db)
    }

    /// Reads records from `reader`. Blank lines and `#` comments are skipped,
    /// malformed records are logged and skipped, I/O errors are returned.
    pub fn from_reader(mut reader: impl BufRead, opts: &AnnotationOptions) -> Result<Self, Error> {
        let mut db = Self::default();
        let mut line = String::new();
        let mut line_no = 0usize;
        let (mut filtered, mut malformed) = (0usize, 0usize);

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            line_no += 1;

            let record = line.trim_end_matches(['\n', '\r']);
            if record.trim().is_empty() || record.starts_with('#') {
                continue;
            }

            match AnnotationRecord::parse_line(record, opts) {
                Ok(Some(r)) => db.insert(r),
                Ok(None) => filtered += 1,
                Err(err) => {
                    malformed += 1;
                    event!(Level::WARN, "skipping line {line_no}: {err:#}");
                }
            }
        }

        event!(
            Level::DEBUG,
            "{} records kept, {} filtered, {} malformed",
            db.len(),
            filtered,
            malformed
        );

        Ok(db)
    }

    /// Adds a record. A repeated transcript id replaces the earlier record.
    pub fn insert(&mut self, record: AnnotationRecord) {
        match self.index.get(&record.transcript_id) {
            Some(&i) => self.records[i] = record,
            None => {
                self.index
                    .insert(record.transcript_id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&TranscriptCoords> {
        self.index.get(id).map(|&i| &self.records[i].coords)
    }

    /// Like [`TranscriptDb::get`], with an error naming the missing id.
    pub fn lookup(&self, id: &str) -> Result<&TranscriptCoords, Error> {
        let &i = self.index.get_or_keyerr(id)?;
        Ok(&self.records[i].coords)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnotationRecord> {
        self.records.iter()
    }

    /// Gene id -> its transcript ids, in file order.
    pub fn genes(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut genes: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for r in &self.records {
            genes
                .entry(r.gene_id.as_str())
                .or_default()
                .push(r.transcript_id.as_str());
        }
        genes
    }

    /// Reads the two boundary columns of every record as a custom box.
    ///
    /// Boxes keep whatever clipping the db was loaded with, so load it with
    /// `clip_to_codons: false` when the columns hold boxes.
    pub fn as_custom_boxes(mut self) -> Self {
        for r in &mut self.records {
            r.coords = r.coords.into_custom_box();
        }
        self
    }
}

/// Reads whitespace-separated transcript ids from a flat file.
///
/// Returns `None` when no file is given.
pub fn read_transcript_ids(path: Option<impl AsRef<Path>>) -> Result<Option<Vec<String>>, Error> {
    let Some(path) = path else {
        return Ok(None);
    };
    let path = path.as_ref();

    let reader = LineReader::from_path(path)
        .with_context(|| format!("Could not read the TR-IDs file: {}", path.display()))?;

    transcript_ids_from_reader(reader)
        .with_context(|| format!("Could not read the TR-IDs file: {}", path.display()))
        .map(Some)
}

pub fn transcript_ids_from_reader(reader: impl BufRead) -> Result<Vec<String>, Error> {
    let mut ids = vec![];
    for line in reader.lines() {
        ids.extend(line?.split_whitespace().map(str::to_string));
    }
    Ok(ids)
}
