//! Integration tests for the clean, load and report stages
//!
//! Raw files are written to temporary directories, cleaned into one dataset,
//! loaded into SQLite and queried.

use book_harvester::cleaning::run_cleaning;
use book_harvester::config::{CleaningConfig, OutputSchema};
use book_harvester::dataset::{load_cleaned_file, DatasetWriter};
use book_harvester::harvest::{parse_volumes, VolumesPage};
use book_harvester::output::build_reports;
use book_harvester::storage::{load_dataset, SqliteStorage, Storage};
use book_harvester::{CleanError, DatasetError};
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str =
    "Title,Authors,Publisher,PublishedDate,ISBN,PageCount,Categories,AverageRating,RatingsCount,Language";

const SHARED_ISBN: &str = "978-0-00-000000-0";

fn write_raw(dir: &Path, name: &str, rows: &[&str]) {
    let mut contents = String::from(HEADER);
    for row in rows {
        contents.push('\n');
        contents.push_str(row);
    }
    contents.push('\n');
    fs::write(dir.join(name), contents).expect("write raw file");
}

fn cleaning_config(input: &Path, output: &Path, schema: OutputSchema) -> CleaningConfig {
    CleaningConfig {
        input_directory: input.display().to_string(),
        search_string: "random_books".to_string(),
        output_path: output.display().to_string(),
        schema,
    }
}

/// Two files overlapping on one ISBN, plus rows every cleaning step drops
fn seed_raw_files(dir: &Path) {
    write_raw(
        dir,
        "random_books_data_1.csv",
        &[
            "First Copy,Ann Author,Ace,2001,978-0-00-000000-0,320,Fiction,4.5,12,en",
            "Short Story,Bo Writer,Ace,2003-02-10,9781111111111,0,Fiction,3.0,4,en",
            "Lost Author,N/A,Tor,2004-01-01,9782222222222,150,History,3.5,7,en",
        ],
    );
    write_raw(
        dir,
        "random_books_data_2.csv",
        &[
            "Second Copy,Cy Other,Tor,2010-06-01,978-0-00-000000-0,99,History,2.0,3,en",
            "Long History,Di Scholar,Tor,2005-07-15,9783333333333.0,640,History,4.0,30,en",
            "Quick Read,Ed Poet,Ace,2005,9784444444444,120,Poetry,5.0,9,fr",
        ],
    );
    // not matched by the search string
    write_raw(
        dir,
        "notes.csv",
        &["Ignored,X,Y,2000,9785555555555,10,Z,1.0,1,en"],
    );
}

#[test]
fn test_overlapping_isbn_keeps_first_row() {
    let raw = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    seed_raw_files(raw.path());
    let output = out.path().join("processed").join("combined_books.csv");

    let dataset = run_cleaning(&cleaning_config(raw.path(), &output, OutputSchema::Analytics))
        .expect("cleaning succeeds");

    let shared: Vec<_> = dataset
        .records
        .iter()
        .filter(|r| r.isbn == SHARED_ISBN)
        .collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].title, "First Copy");
    assert_eq!(shared[0].published_date, NaiveDate::from_ymd_opt(2001, 1, 1));
    assert_eq!(shared[0].year, Some(2001));

    let report = &dataset.report;
    assert_eq!(report.loaded_rows, 6);
    assert_eq!(report.complete_rows, 5);
    assert_eq!(report.nonzero_page_rows, 4);
    assert_eq!(report.unique_rows, 3);

    let isbns: Vec<&str> = dataset.records.iter().map(|r| r.isbn.as_str()).collect();
    assert_eq!(isbns, vec![SHARED_ISBN, "9783333333333", "9784444444444"]);

    let written = load_cleaned_file(&output).expect("cleaned file readable");
    assert_eq!(written, dataset.records);
}

#[test]
fn test_core_schema_omits_year_column() {
    let raw = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    seed_raw_files(raw.path());
    let output = out.path().join("combined.csv");

    run_cleaning(&cleaning_config(raw.path(), &output, OutputSchema::Core)).unwrap();

    let contents = fs::read_to_string(&output).unwrap();
    let header = contents.lines().next().unwrap();
    assert!(header.ends_with("TitleWordCount"));

    // Year is derived again on load
    let records = load_cleaned_file(&output).unwrap();
    assert_eq!(records[0].year, Some(2001));
}

#[test]
fn test_non_numeric_page_count_fails_cleaning() {
    let raw = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_raw(
        raw.path(),
        "random_books_data_1.csv",
        &["Bad,A,B,2001,9780000000001,many,C,4.0,1,en"],
    );

    let result = run_cleaning(&cleaning_config(
        raw.path(),
        &out.path().join("x.csv"),
        OutputSchema::Core,
    ));

    match result {
        Err(CleanError::TypeConversion { row, column, value, .. }) => {
            assert_eq!(row, 1);
            assert_eq!(column, "PageCount");
            assert_eq!(value, "many");
        }
        other => panic!("expected a type conversion error, got {:?}", other.map(|d| d.records)),
    }
}

#[test]
fn test_no_matching_files() {
    let raw = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let result = run_cleaning(&cleaning_config(
        raw.path(),
        &out.path().join("x.csv"),
        OutputSchema::Core,
    ));

    assert!(matches!(
        result,
        Err(CleanError::Dataset(DatasetError::NoInputFiles { .. }))
    ));
}

#[test]
fn test_fetched_records_flow_through_cleaning() {
    let raw = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let body = r#"{
        "items": [
            {"volumeInfo": {
                "title": "A Fetched Book",
                "authors": ["One", "Two"],
                "publisher": "Press",
                "publishedDate": "1999-09",
                "industryIdentifiers": [{"type": "ISBN_13", "identifier": "9786666666666"}],
                "pageCount": 210,
                "categories": ["Science"],
                "averageRating": 3.5,
                "ratingsCount": 4,
                "language": "en"
            }},
            {"volumeInfo": {"title": "Sparse Book"}}
        ]
    }"#;
    let page: VolumesPage = serde_json::from_str(body).unwrap();
    let records = parse_volumes(page.items.as_deref().unwrap_or_default());

    let writer = DatasetWriter::new(raw.path(), "random_books_data_", ".csv");
    let written = writer.write(&records).unwrap();
    assert!(written.ends_with("random_books_data_1.csv"));

    let dataset = run_cleaning(&cleaning_config(
        raw.path(),
        &out.path().join("combined.csv"),
        OutputSchema::Analytics,
    ))
    .unwrap();

    // the sparse volume is all sentinels and is dropped as incomplete
    assert_eq!(dataset.report.loaded_rows, 2);
    assert_eq!(dataset.records.len(), 1);

    let book = &dataset.records[0];
    assert_eq!(book.authors, "One, Two");
    assert_eq!(book.published_date, NaiveDate::from_ymd_opt(1999, 9, 1));
    assert_eq!(book.title_word_count, 3);
}

#[test]
fn test_loaded_store_answers_reports() {
    let raw = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    seed_raw_files(raw.path());
    let output = out.path().join("combined.csv");
    run_cleaning(&cleaning_config(raw.path(), &output, OutputSchema::Analytics)).unwrap();

    let mut storage = SqliteStorage::new(&out.path().join("books.db")).unwrap();
    let inserted = load_dataset(&mut storage, &output, "hash").unwrap();
    assert_eq!(inserted, 3);
    assert_eq!(storage.count_books().unwrap(), 3);

    let sections = build_reports(&storage).unwrap();
    assert_eq!(sections.len(), 6);

    // mean rating is (4.5 + 4.0 + 5.0) / 3 = 4.5
    let above_average = &sections[0];
    assert_eq!(above_average.rows, vec![vec!["Quick Read".to_string(), "5".to_string()]]);

    let top_rated = &sections[3];
    let categories: Vec<&str> = top_rated.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(categories, vec!["Fiction", "History", "Poetry"]);

    let by_year = &sections[5];
    assert_eq!(by_year.rows.len(), 3);
    assert_eq!(by_year.rows[0][1], "2005");
    assert!(by_year.rows[0].join(" | ").contains("4.5"));

    let run = storage.get_latest_load_run().unwrap().unwrap();
    assert_eq!(run.row_count, 3);
    assert_eq!(run.config_hash, "hash");
}
