use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use schema_validator::schema::{Schema, SchemaFile};
use schema_validator::validation::{Dataset, Record, ValidationEngine};
use serde_json::json;
use std::hint::black_box;

const SCHEMA: &str = r#"
- name: Class
  fields:
    - name: class_id
      type: int
    - name: name
      type: str
      constraints:
        pattern: 'Class [0-9]+'
- name: Tutor
  fields:
    - name: employee_id
      type: int
  relationships:
    - schema: one_to_many
      target: Class
      attribute: Class
      type: List[int]
- name: Student
  fields:
    - name: student_id
      type: int
  relationships:
    - schema: many_to_many
      target: Class
      attribute: Class
      type: List[int]
    - schema: many_to_one
      target: Tutor
      attribute: mentor
"#;

fn schema() -> Schema {
    let file: SchemaFile = serde_yaml::from_str(SCHEMA).expect("schema");
    Schema::from_file(file).expect("valid schema")
}

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Generate a school dataset; `error_rate` of 1 in N students references a
/// class that does not exist
fn generate_dataset(students: usize, error_rate: usize) -> Dataset {
    let classes = (students / 20).max(1);
    let tutors = (students / 50).max(1);
    let mut dataset = Dataset::new();

    dataset.insert(
        "Class".to_string(),
        (0..classes)
            .map(|i| record(json!({"class_id": i, "name": format!("Class {i}")})))
            .collect(),
    );
    dataset.insert(
        "Tutor".to_string(),
        (0..tutors)
            .map(|i| record(json!({"employee_id": i, "Class": [i % classes]})))
            .collect(),
    );
    dataset.insert(
        "Student".to_string(),
        (0..students)
            .map(|i| {
                let class = if error_rate > 0 && i % error_rate == 0 {
                    classes + 1
                } else {
                    i % classes
                };
                record(json!({
                    "student_id": i,
                    "Class": [class, (i + 1) % classes],
                    "mentor": i % tutors
                }))
            })
            .collect(),
    );
    dataset
}

fn bench_engine_scalability(c: &mut Criterion) {
    let engine = ValidationEngine::new(&schema()).expect("engine");
    let mut group = c.benchmark_group("engine_scalability");

    for &size in &[100, 1_000, 10_000] {
        let dataset = generate_dataset(size, 10);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("students", size), &dataset, |b, dataset| {
            b.iter(|| black_box(engine.run(black_box(dataset))))
        });
    }

    group.finish();
}

fn bench_error_density(c: &mut Criterion) {
    let engine = ValidationEngine::new(&schema()).expect("engine");
    let mut group = c.benchmark_group("error_density");

    for &(name, rate) in &[("clean", 0), ("one_in_ten", 10), ("all_bad", 1)] {
        let dataset = generate_dataset(2_000, rate);
        group.bench_with_input(BenchmarkId::new("rate", name), &dataset, |b, dataset| {
            b.iter(|| black_box(engine.run(black_box(dataset))))
        });
    }

    group.finish();
}

fn bench_engine_compile(c: &mut Criterion) {
    let schema = schema();
    c.bench_function("engine_compile", |b| {
        b.iter(|| black_box(ValidationEngine::new(black_box(&schema))))
    });
}

criterion_group!(
    validation_benches,
    bench_engine_scalability,
    bench_error_density,
    bench_engine_compile
);

criterion_main!(validation_benches);
