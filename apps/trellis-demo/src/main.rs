use std::cell::{Cell, RefCell};
use std::rc::Rc;

use trellis_core::{
    set_error_reporter, ArrayModel, Destroy, Host, HostNodeId, ItemId, MemoryHost, Reference, Scope,
    SharedHost, WritableCell,
};
use trellis_runtime_std::DeferredExecutor;
use trellis_ui::{Component, Fragment, TagOptions, Tree};

#[derive(Clone, Debug, PartialEq)]
struct Task {
    title: String,
    urgent: bool,
}

impl Task {
    fn new(title: &str, urgent: bool) -> Self {
        Self {
            title: title.to_string(),
            urgent,
        }
    }
}

struct TaskBoard {
    tasks: Rc<ArrayModel<Task>>,
    show_help: Rc<Reference<bool>>,
    heading: Rc<Reference<String>>,
}

impl Component for TaskBoard {
    fn compose(&self, fragment: &Fragment) {
        fragment.tag_with("h1", TagOptions::new().class("title"), |h1| {
            h1.text_cell(&self.heading);
        });
        fragment.when(&self.show_help, |help| {
            help.tag("p", |p| {
                p.text("Tasks marked urgent are highlighted.");
            });
        });
        fragment.tag("ol", |list| {
            list.repeat(&self.tasks, |item: &Fragment, task: &Task, _: &ItemId| {
                let options = if task.urgent {
                    TagOptions::new().class("urgent")
                } else {
                    TagOptions::new()
                };
                item.tag_with("li", options, |li| {
                    li.text(&task.title);
                });
            });
        });
    }

    fn ready(&self, fragment: &Fragment) {
        log::info!("task board ready as fragment {}", fragment.id());
    }

    fn dispose(&self) {
        log::info!("task board disposed");
    }
}

fn print_frame(label: &str, memory: &Rc<RefCell<MemoryHost>>, container: HostNodeId) {
    println!("--- {label} ---");
    print!("{}", memory.borrow().dump_tree(Some(container)));
}

fn main() {
    env_logger::init();
    set_error_reporter(|fault| log::warn!("handler fault: {fault}"));

    println!("=== Trellis Task Board ===");

    let memory = Rc::new(RefCell::new(MemoryHost::new()));
    let container = memory.borrow_mut().create_element("main");
    let host: SharedHost = memory.clone();

    let executor = Rc::new(DeferredExecutor::new());
    let frame_requested = Rc::new(Cell::new(false));
    let requested = Rc::clone(&frame_requested);
    executor.set_flush_waker(move || requested.set(true));
    let tree = Tree::with_executor(host, executor.clone());

    let app = Scope::new();
    let tasks = app.register(Rc::new(ArrayModel::from_vec(vec![
        Task::new("Write the parser", true),
        Task::new("Review docs", false),
    ])));
    let show_help = app.reference(true);
    let heading = app.reference(String::from("Today"));

    let root = tree.mount(container, |root| {
        root.component(TaskBoard {
            tasks: Rc::clone(&tasks),
            show_help: Rc::clone(&show_help),
            heading: Rc::clone(&heading),
        });
    });

    let frame = |label: &str| {
        if frame_requested.replace(false) {
            let applied = executor.flush();
            log::debug!("frame {label}: {applied} host commands");
        }
        print_frame(label, &memory, container);
    };

    frame("initial");

    tasks.insert(1, Task::new("Fix the flaky test", true));
    show_help.set(false);
    frame("after edits");

    heading.set(String::from("Tomorrow"));
    tasks.sort_by(|a, b| a.title.cmp(&b.title));
    frame("sorted");

    root.destroy();
    app.destroy();
    frame("teardown");
    println!("live fragments: {}", tree.len());
}
