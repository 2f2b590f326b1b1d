use chrono::{NaiveDate, Weekday};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use estately_appointments::availability::format_appointment_data;
use estately_appointments::calendar::{build_calendar_grid, YearMonth};
use serde_json::{json, Map, Value};

// A month payload with `slots_per_day` half-hour slots on every weekday-ish day
fn month_payload(slots_per_day: usize) -> Value {
    let mut days = Map::new();
    for day in (1..=30).filter(|d| d % 7 != 0) {
        let slots: Vec<Value> = (0..slots_per_day)
            .map(|i| {
                let start = 8 * 60 + 30 * i;
                let end = start + 30;
                json!({
                    "id": day * 100 + i as u32,
                    "start_time": format!("{:02}:{:02}", start / 60, start % 60),
                    "end_time": format!("{:02}:{:02}", end / 60, end % 60),
                })
            })
            .collect();
        days.insert(day.to_string(), Value::Array(slots));
    }
    json!({
        "month": 6,
        "year": 2024,
        "availability_types": "virtual,phone,in_person",
        "days": days,
    })
}

fn benchmark_calendar_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_calendar_grid");
    let june = YearMonth::new(2024, 6).unwrap();
    let selected = NaiveDate::from_ymd_opt(2024, 6, 12);

    let no_days: Vec<u32> = Vec::new();
    group.bench_function("no_available_days", |b| {
        b.iter(|| build_calendar_grid(black_box(june), black_box(&no_days), None, Weekday::Sun))
    });

    let every_day: Vec<u32> = (1..=30).collect();
    group.bench_function("every_day_available", |b| {
        b.iter(|| {
            build_calendar_grid(
                black_box(june),
                black_box(&every_day),
                black_box(selected),
                Weekday::Mon,
            )
        })
    });

    group.finish();
}

fn benchmark_format_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_appointment_data");
    let reference = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

    for slots_per_day in [1usize, 8, 20] {
        let payload = month_payload(slots_per_day);
        group.bench_function(format!("{}_slots_per_day", slots_per_day), |b| {
            b.iter(|| format_appointment_data(black_box(&payload), black_box(reference)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_calendar_grid, benchmark_format_schedule);
criterion_main!(benches);
