use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use json_config::{FlattenConfig, JsonConfigParser, PathContext, flatten, load_document, parse_str};

/// Generate nested JSON objects for flattening benchmarks
fn generate_nested_json(depth: usize, breadth: usize) -> String {
    fn generate_object(current_depth: usize, max_depth: usize, breadth: usize) -> String {
        if current_depth >= max_depth {
            return r#"{ "leaf": true }"#.to_string();
        }

        let mut content = String::from("{\n");
        for i in 0..breadth {
            content.push_str(&format!(
                "  \"key_{}\": {},\n",
                i,
                generate_object(current_depth + 1, max_depth, breadth)
            ));
        }
        content.push_str("  \"simple_value\": \"test\",\n");
        content.push_str("  \"number_value\": 42,\n");
        content.push_str("  \"array_value\": [1, 2, 3, \"four\", true]\n");
        content.push('}');
        content
    }

    generate_object(0, depth, breadth)
}

/// Generate a flat settings document with `count` sections
fn generate_settings(count: usize) -> String {
    let sections: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#""Service{i}": {{ "Url": "https://svc-{i}.internal", "TimeoutMs": {timeout}, "Retries": [100, 200, 400], "Enabled": true }}"#,
                i = i,
                timeout = 1000 + i,
            )
        })
        .collect();
    format!("{{{}}}", sections.join(","))
}

/// Benchmark parsing plus flattening of a typical settings file
fn bench_parse_and_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_and_flatten");

    let app_settings = r#"{
        "Logging": { "LogLevel": { "Default": "Information", "System": "Warning" } },
        "AllowedHosts": "*",
        "ConnectionStrings": { "Primary": "Server=db;Database=app", "Cache": null },
        "Endpoints": [ { "Url": "http://0.0.0.0:5000" }, { "Url": "https://0.0.0.0:5001" } ],
        "Limits": { "MaxConnections": 100, "Timeout": 30.5 }
    }"#;

    group.throughput(Throughput::Bytes(app_settings.len() as u64));
    group.bench_function("app_settings", |b| {
        b.iter(|| parse_str(black_box(app_settings)));
    });

    for count in [10, 100, 1000] {
        let settings = generate_settings(count);
        group.throughput(Throughput::Bytes(settings.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("sections", count),
            &settings,
            |b, content| {
                b.iter(|| parse_str(black_box(content)));
            },
        );
    }

    group.finish();
}

/// Benchmark flattening an already parsed tree
fn bench_flatten_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten_tree");

    for depth in [3, 5] {
        for breadth in [2, 4, 6] {
            let content = generate_nested_json(depth, breadth);
            let document = load_document(content.as_bytes()).expect("benchmark input is valid");

            group.bench_with_input(
                BenchmarkId::new("nested", format!("d{}_b{}", depth, breadth)),
                &document,
                |b, document| {
                    b.iter(|| flatten(black_box(document)));
                },
            );
        }
    }

    group.finish();
}

/// Benchmark parser configuration variants
fn bench_flatten_config(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten_config");
    let content = generate_nested_json(4, 4);

    let default_parser = JsonConfigParser::new();
    group.bench_function("default_config", |b| {
        b.iter(|| default_parser.parse_str(black_box(&content)));
    });

    let limited_parser = JsonConfigParser::with_config(FlattenConfig::new().with_max_depth(16));
    group.bench_function("max_depth_limited", |b| {
        b.iter(|| limited_parser.parse_str(black_box(&content)));
    });

    group.finish();
}

/// Benchmark path composition
fn bench_path_context(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_context");

    group.bench_function("enter_exit_depth_8", |b| {
        b.iter(|| {
            let mut context = PathContext::new();
            for i in 0..8 {
                context.enter(format!("segment_{}", i));
                black_box(context.current_path());
            }
            for _ in 0..8 {
                context.exit();
            }
            context
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_and_flatten,
    bench_flatten_tree,
    bench_flatten_config,
    bench_path_context
);
criterion_main!(benches);
