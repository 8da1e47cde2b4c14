//! Benchmarks for book assembly, validation and rendering.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tb_book::{Book, BookInfo, BookOptions};
use tb_markup::Locale;
use tb_store::RawFragment;

const ROOT: &str = "Manual";

/// A root with `chapters` chapters of `sections` sections each.
fn synthetic_book(chapters: usize, sections: usize) -> Vec<RawFragment> {
    let mut raw = Vec::new();
    let mut root = String::from("Introduction.\n!sequential reading\n");
    for c in 0..chapters {
        let chapter = format!("Chapter {c}");
        root.push_str(&format!("*[[{chapter}]]\n"));

        let mut text = format!("About ''chapter'' {c}.\n!sequential reading\n");
        for s in 0..sections {
            let section = format!("Section {c}.{s}");
            text.push_str(&format!("*[[{section}]]\n"));
            raw.push(RawFragment::new(
                section,
                &[chapter.as_str()],
                format!(
                    "Body of //section// {c}.{s}, see [[{chapter}]].\n\n\
                     |Name|Value|h\n|alpha|1|\n|beta|2|\n\n* one\n** two\n"
                ),
            ));
        }
        raw.push(RawFragment::new(chapter.clone(), &[ROOT, ":chapter"], text));
    }
    raw.push(RawFragment::new(ROOT, &[], root));
    raw
}

fn options() -> BookOptions {
    BookOptions::new(Locale::En).with_root_alias(ROOT)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("book_build");

    for (chapters, sections) in [(5, 5), (20, 10)] {
        let raw = synthetic_book(chapters, sections);
        let id = BenchmarkId::from_parameter(raw.len());
        group.bench_with_input(id, &raw, |b, raw| {
            b.iter(|| Book::from_fragments(raw.clone(), &options()).unwrap());
        });
    }

    group.finish();
}

fn bench_validate_and_render(c: &mut Criterion) {
    let book = Book::from_fragments(synthetic_book(20, 10), &options()).unwrap();
    let info = BookInfo::new("Bench");

    let mut group = c.benchmark_group("book_output");

    group.bench_function("validate", |b| b.iter(|| book.validate()));
    group.bench_function("render_docbook", |b| {
        b.iter(|| book.render_docbook(&info).unwrap());
    });
    group.bench_function("render_wiki_files", |b| {
        b.iter(|| book.render_wiki_files().unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_validate_and_render);
criterion_main!(benches);
