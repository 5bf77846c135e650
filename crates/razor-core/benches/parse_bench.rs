use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use razor_core::lexer::SpanTokenizer;
use razor_core::{RazorParserOptions, RazorSyntaxTree, SourceDocument};
use std::hint::black_box;

const ROW: &str = r#"<tr class="@(i % 2 == 0 ? "even" : "odd")">
    <td>@item.Name</td>
    <td><a href="~/items/@item.Id">Details</a></td>
    @if (item.IsNew)
    {
        <td><span class="badge">new</span></td>
    }
    else
    {
        <td>@* nothing *@</td>
    }
</tr>
"#;

/// A page with a header, a code block and `rows` table rows
fn synthetic_page(rows: usize) -> String {
    let mut page = String::from(
        "@using System.Linq\n@model ItemsModel\n@{\n    var title = \"Items\";\n}\n<h1>@title</h1>\n<table>\n",
    );
    for _ in 0..rows {
        page.push_str(ROW);
    }
    page.push_str("</table>\n");
    page
}

fn bench_tokenize(c: &mut Criterion) {
    let source = SourceDocument::new(synthetic_page(50), None);

    c.bench_function("tokenize_markup", |b| {
        b.iter(|| black_box(SpanTokenizer::Markup.tokenize(&source).len()))
    });
    c.bench_function("tokenize_code", |b| {
        b.iter(|| black_box(SpanTokenizer::CSharp.tokenize(&source).len()))
    });
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for &rows in &[10, 100, 500] {
        let page = synthetic_page(rows);
        let bytes = page.len();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{rows}_rows_{}KB", bytes / 1024)),
            &page,
            |b, page| {
                b.iter(|| {
                    let source = SourceDocument::new(page.as_str(), None);
                    black_box(RazorSyntaxTree::parse(source, RazorParserOptions::default()))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_parse);
criterion_main!(benches);
