//! Benchmarks for template building, applying and persistence.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagefields::template::xml;
use pagefields::{
    apply_template, bind_results, build_template, Field, FieldData, PageArea, PageScope, Rect,
    Session,
};

/// Creates a session with `page_count` pages, each holding a text field,
/// a table with three separators and a barcode.
fn create_test_session(page_count: usize) -> Session {
    let mut session = Session::new();
    for _ in 0..page_count {
        let page = session.add_page(612.0, 792.0);
        let scope = PageScope::Page(page);

        let text_name = session.generate_name("Text");
        session
            .add_field(page, Field::text(text_name, scope, Rect::new(50.0, 40.0, 200.0, 20.0)))
            .unwrap();

        let table_name = session.generate_name("Table");
        let table = Field::table(table_name, scope, Rect::new(40.0, 200.0, 520.0, 300.0))
            .with_separator(120.0)
            .and_then(|t| t.with_separator(260.0))
            .and_then(|t| t.with_separator(400.0))
            .unwrap();
        session.add_field(page, table).unwrap();

        let barcode_name = session.generate_name("Barcode");
        session
            .add_field(page, Field::barcode(barcode_name, scope, Rect::new(450.0, 700.0, 100.0, 60.0)))
            .unwrap();
    }
    session
}

/// Benchmark building templates at various sizes.
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_template");

    for page_count in [1, 10, 100].iter() {
        let session = create_test_session(*page_count);

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| build_template(black_box(&session)));
        });
    }

    group.finish();
}

/// Benchmark applying a template onto a page twice as wide.
fn bench_apply(c: &mut Criterion) {
    let template = build_template(&create_test_session(10));

    c.bench_function("apply_template_rescaled", |b| {
        b.iter(|| {
            let mut session = Session::new();
            let page = session.add_page(1224.0, 1584.0);
            apply_template(&mut session, black_box(&template), page)
        });
    });
}

/// Benchmark XML serialization and parsing.
fn bench_xml(c: &mut Criterion) {
    let template = build_template(&create_test_session(10));
    let text = xml::to_xml_string(&template).unwrap();

    c.bench_function("template_to_xml", |b| {
        b.iter(|| xml::to_xml_string(black_box(&template)).unwrap());
    });

    c.bench_function("template_from_xml", |b| {
        b.iter(|| xml::from_xml_str(black_box(&text)).unwrap());
    });
}

/// Benchmark binding one result per field.
fn bench_bind(c: &mut Criterion) {
    let session = create_test_session(10);
    let results: Vec<FieldData> = session
        .fields()
        .map(|(id, f)| {
            FieldData::new(
                f.name(),
                session.field_page(id).unwrap_or(0),
                PageArea::text("value"),
            )
        })
        .collect();

    c.bench_function("bind_results", |b| {
        b.iter_batched(
            || create_test_session(10),
            |mut session| bind_results(&mut session, black_box(&results)),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_build, bench_apply, bench_xml, bench_bind);
criterion_main!(benches);
