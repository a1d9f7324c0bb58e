use bpmn_rs_renderer::bpmn::render_bpmn;
use bpmn_rs_renderer::config::{LayoutConfig, RenderConfig};
use bpmn_rs_renderer::ir::{NodeKind, ProcessModel};
use bpmn_rs_renderer::layout::compute_layout;
use bpmn_rs_renderer::parser::parse_process;
use bpmn_rs_renderer::render::render_svg;
use bpmn_rs_renderer::theme::Theme;
use bpmn_rs_renderer::validate::validate;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn chain_model(tasks: usize) -> ProcessModel {
    let mut model = ProcessModel::new("Chain");
    model.add_node("start", NodeKind::Start, None);
    let mut last = "start".to_string();
    for i in 0..tasks {
        let id = format!("task_{i}");
        model
            .add_node(&id, NodeKind::Task, Some(&format!("Task {i}")))
            .add_flow(&format!("flow_{i}"), &last, &id);
        last = id;
    }
    model
        .add_node("end", NodeKind::End, None)
        .add_flow("flow_end", &last, "end");
    model
}

/// `stages` consecutive split/merge blocks, each fanning out to `width` tasks.
fn diamond_model(stages: usize, width: usize) -> ProcessModel {
    let mut model = ProcessModel::new("Diamonds");
    model.add_node("start", NodeKind::Start, None);
    let mut last = "start".to_string();
    let mut flow = 0usize;
    let mut next_flow = || {
        flow += 1;
        format!("flow_{flow}")
    };
    for stage in 0..stages {
        let split = format!("split_{stage}");
        let join = format!("join_{stage}");
        model
            .add_node(&split, NodeKind::ExclusiveGateway, None)
            .add_flow(&next_flow(), &last, &split);
        for branch in 0..width {
            let task = format!("task_{stage}_{branch}");
            model
                .add_node(&task, NodeKind::Task, Some(&format!("Branch {branch}")))
                .add_flow(&next_flow(), &split, &task);
        }
        model.add_node(&join, NodeKind::ExclusiveGateway, None);
        for branch in 0..width {
            let task = format!("task_{stage}_{branch}");
            model.add_flow(&next_flow(), &task, &join);
        }
        last = join;
    }
    model
        .add_node("end", NodeKind::End, None)
        .add_flow(&next_flow(), &last, "end");
    model
}

fn cases() -> Vec<(&'static str, ProcessModel)> {
    vec![
        ("chain_10", chain_model(10)),
        ("chain_1000", chain_model(1000)),
        ("diamond_5x3", diamond_model(5, 3)),
        ("diamond_50x6", diamond_model(50, 6)),
    ]
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, model) in cases() {
        let json = serde_json::to_string(&bpmn_rs_renderer::ProcessDocument::from(model))
            .expect("serialize failed");
        group.bench_with_input(BenchmarkId::from_parameter(name), &json, |b, data| {
            b.iter(|| {
                let parsed = parse_process(black_box(data)).expect("parse failed");
                black_box(parsed.process.nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    for (name, model) in cases() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &model, |b, model| {
            b.iter(|| black_box(validate(black_box(model)).len()));
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();
    for (name, model) in cases() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &model, |b, model| {
            b.iter(|| {
                let layout = compute_layout(black_box(model), &config).expect("layout failed");
                black_box(layout.nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    let config = LayoutConfig::default();
    let theme = Theme::default();
    let render = RenderConfig::default();
    for (name, model) in cases() {
        let layout = compute_layout(&model, &config).expect("layout failed");
        group.bench_with_input(
            BenchmarkId::new("bpmn", name),
            &(&model, &layout),
            |b, (model, layout)| {
                b.iter(|| black_box(render_bpmn(model, layout).len()));
            },
        );
        group.bench_with_input(BenchmarkId::new("svg", name), &layout, |b, layout| {
            b.iter(|| black_box(render_svg(layout, &theme, &render, None).len()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_validate,
    bench_layout,
    bench_serialize
);
criterion_main!(benches);
