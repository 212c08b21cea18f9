//! File export for chat transcripts, query history and reviews.
//!
//! Each collection can be written as TXT, CSV, or JSON. Parent directories
//! are created as needed.

use csv::Writer;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::models::{Message, OutputFormat, QueryResult, Review, Sender};

const TIMESTAMP_FORMAT: &str = "%b %d, %Y %r";

#[derive(Serialize)]
struct MessageRecord<'a> {
    id: &'a str,
    sender: &'static str,
    timestamp: String,
    language: &'static str,
    text: &'a str,
}

#[derive(Serialize)]
struct QueryRowRecord<'a> {
    query: &'a str,
    executed_at: String,
    id: u32,
    name: &'a str,
    email: &'a str,
    created_at: &'a str,
}

#[derive(Serialize)]
struct ReviewRecord<'a> {
    id: &'a str,
    author: &'a str,
    rating: u8,
    title: &'a str,
    comment: &'a str,
    date: String,
    likes: u64,
    dislikes: u64,
    language: &'static str,
    category: &'static str,
}

const fn sender_name(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "Vous",
        Sender::Assistant => "Assistant IA",
    }
}

fn message_records(messages: &[Message]) -> Vec<MessageRecord<'_>> {
    messages
        .iter()
        .map(|m| MessageRecord {
            id: &m.id,
            sender: sender_name(m.sender),
            timestamp: m.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            language: m.language.map_or("", |l| l.code()),
            text: &m.text,
        })
        .collect()
}

fn query_records(history: &[QueryResult]) -> Vec<QueryRowRecord<'_>> {
    history
        .iter()
        .flat_map(|result| {
            let executed_at = result.timestamp.format(TIMESTAMP_FORMAT).to_string();
            result.rows.iter().map(move |row| QueryRowRecord {
                query: &result.query,
                executed_at: executed_at.clone(),
                id: row.id,
                name: &row.name,
                email: &row.email,
                created_at: &row.created_at,
            })
        })
        .collect()
}

fn review_records(reviews: &[Review]) -> Vec<ReviewRecord<'_>> {
    reviews
        .iter()
        .map(|r| ReviewRecord {
            id: &r.id,
            author: &r.author,
            rating: r.rating,
            title: &r.title,
            comment: &r.comment,
            date: r.date.format("%Y-%m-%d").to_string(),
            likes: r.like_count,
            dislikes: r.dislike_count,
            language: r.language.code(),
            category: r.category.label(),
        })
        .collect()
}

fn prepare(file_path: &Path) -> Result<File> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    Ok(File::create(file_path)?)
}

fn write_csv<T: Serialize>(records: &[T], file_path: &Path) -> Result<()> {
    let mut writer = Writer::from_writer(prepare(file_path)?);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize>(records: &[T], file_path: &Path) -> Result<()> {
    let writer = BufWriter::new(prepare(file_path)?);
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

/// Write a chat transcript.
///
/// TXT format: `sender, timestamp, text` followed by a blank line.
pub fn write_transcript(messages: &[Message], format: OutputFormat, file_path: &Path) -> Result<()> {
    let records = message_records(messages);
    match format {
        OutputFormat::Txt => {
            let mut writer = BufWriter::new(prepare(file_path)?);
            for record in &records {
                writeln!(writer, "{}, {}, {}", record.sender, record.timestamp, record.text)?;
                writeln!(writer)?;
            }
            writer.flush()?;
            Ok(())
        }
        OutputFormat::Csv => write_csv(&records, file_path),
        OutputFormat::Json => write_json(&records, file_path),
    }
}

/// Write the query history, one line or record per returned row.
pub fn write_query_history(history: &[QueryResult], format: OutputFormat, file_path: &Path) -> Result<()> {
    match format {
        OutputFormat::Txt => {
            let mut writer = BufWriter::new(prepare(file_path)?);
            for result in history {
                writeln!(
                    writer,
                    "> {} ({})",
                    result.query,
                    result.timestamp.format(TIMESTAMP_FORMAT)
                )?;
                for row in &result.rows {
                    writeln!(writer, "{} | {} | {} | {}", row.id, row.name, row.email, row.created_at)?;
                }
                writeln!(writer)?;
            }
            writer.flush()?;
            Ok(())
        }
        OutputFormat::Csv => write_csv(&query_records(history), file_path),
        // JSON keeps the nesting
        OutputFormat::Json => write_json(history, file_path),
    }
}

/// Write reviews.
pub fn write_reviews(reviews: &[Review], format: OutputFormat, file_path: &Path) -> Result<()> {
    let records = review_records(reviews);
    match format {
        OutputFormat::Txt => {
            let mut writer = BufWriter::new(prepare(file_path)?);
            for record in &records {
                writeln!(
                    writer,
                    "[{}] {} ({}/5, {}) - {}",
                    record.id, record.title, record.rating, record.category, record.author
                )?;
                writeln!(writer, "{}", record.comment)?;
                writeln!(writer)?;
            }
            writer.flush()?;
            Ok(())
        }
        OutputFormat::Csv => write_csv(&records, file_path),
        OutputFormat::Json => write_json(&records, file_path),
    }
}
