use std::cell::RefCell;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trellis_core::{ArrayModel, Host, ItemId, MemoryHost, SharedHost};
use trellis_ui::{Fragment, Tree};

const LIST_SIZES: &[usize] = &[64, 256, 1024];

struct ListFixture {
    memory: Rc<RefCell<MemoryHost>>,
    model: Rc<ArrayModel<usize>>,
    _root: Fragment,
}

impl ListFixture {
    fn new(size: usize) -> Self {
        let memory = Rc::new(RefCell::new(MemoryHost::new()));
        let container = memory.borrow_mut().create_element("ul");
        let host: SharedHost = memory.clone();
        let tree = Tree::new(host);
        let model = Rc::new(ArrayModel::from_vec((0..size).collect()));
        let root = tree.mount(container, |root| {
            root.repeat(&model, |item: &Fragment, value: &usize, _: &ItemId| {
                item.tag("li", |li| {
                    li.text(&value.to_string());
                });
            });
        });
        Self {
            memory,
            model,
            _root: root,
        }
    }
}

fn bench_seed(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyed_view_seed");
    for &size in LIST_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let fixture = ListFixture::new(size);
                black_box(fixture.memory.borrow().len());
            });
        });
    }
    group.finish();
}

fn bench_middle_splice(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyed_view_middle_splice");
    for &size in LIST_SIZES {
        let fixture = ListFixture::new(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let removed = fixture.model.splice(size / 2, 1, [size, size + 1]);
                fixture.model.splice(size / 2, 2, removed);
            });
        });
    }
    group.finish();
}

fn bench_reverse(c: &mut Criterion) {
    let fixture = ListFixture::new(256);
    c.bench_function("keyed_view_reverse", |b| {
        b.iter(|| {
            fixture.model.reverse();
            black_box(fixture.model.len());
        });
    });
}

criterion_group!(keyed_view, bench_seed, bench_middle_splice, bench_reverse);
criterion_main!(keyed_view);
