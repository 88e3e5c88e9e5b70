//! Project Row Component
//!
//! Project header plus, when open, the main row of day cells and one lane
//! per group of non-overlapping sub-projects.

use chrono::{Duration, NaiveDate};
use leptos::prelude::*;
use leptos_dragdrop::{animate_landing, make_on_mousedown, make_on_touchstart, DragPayload};
use timeline_engine::dnd::drag_id;
use timeline_engine::geometry::pack_lanes;
use timeline_engine::sync::ChildPolicy;
use timeline_engine::virtualize::ProjectRow;

use crate::components::DayCell;
use crate::context::AppContext;
use crate::models::{EntityKind, Item, Milestone, Project, ProjectData, SubProject};
use crate::store::{store_set_measured_height, store_toggle_project, use_app_store, AppStateStoreFields};

/// Days of the column window that are rendered, with their left edge
pub type VisibleDays = Signal<Vec<(f64, NaiveDate)>>;

/// Default length of a sub-project created from the header
const NEW_SUB_PROJECT_DAYS: i64 = 7;

#[component]
pub fn ProjectRowView(row: ProjectRow, days: VisibleDays) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();
    let metrics = ctx.metrics();
    let project = row.project.clone();
    let project_id = project.id.clone();
    let body_ref = NodeRef::<leptos::html::Div>::new();

    let data = {
        let project_id = project_id.clone();
        Signal::derive(move || {
            let show_completed = store.structure().with(|s| s.settings.show_completed);
            let mut data = store
                .data()
                .with(|d| d.get(&project_id).cloned().unwrap_or_default());
            if !show_completed {
                data.items.retain(|i| !(i.is_task() && i.completed));
            }
            data
        })
    };

    // Feed the laid-out body height back into the row estimate
    {
        let project_id = project_id.clone();
        Effect::new(move |_| {
            data.track();
            if let Some(el) = body_ref.get() {
                let height = el.get_bounding_client_rect().height();
                store_set_measured_height(&store, &project_id, height);
            }
        });
    }

    let main_height = row.expanded.as_ref().map_or(metrics.base_row_height, |h| h.main_row_height);
    let lane_heights = row
        .expanded
        .as_ref()
        .map(|h| h.sub_project_row_heights.clone())
        .unwrap_or_default();

    let body = row.open.then(|| {
        let lanes = move || {
            data.with(|d| {
                pack_lanes(&d.sub_projects)
                    .into_iter()
                    .map(|lane| lane.into_iter().cloned().collect::<Vec<SubProject>>())
                    .collect::<Vec<_>>()
            })
        };
        let main_project_id = project_id.clone();

        view! {
            <div class="project-body" node_ref=body_ref>
                <div class="project-main-row" style=format!("min-height: {}px;", main_height)>
                    <For
                        each=move || days.get()
                        key=|(x, date)| (x.to_bits(), *date)
                        children=move |(x, date)| {
                            let items = Signal::derive(move || {
                                data.with(|d| {
                                    d.items
                                        .iter()
                                        .filter(|i| i.date == date && i.sub_project_id.is_none())
                                        .cloned()
                                        .collect::<Vec<Item>>()
                                })
                            });
                            let milestones = Signal::derive(move || {
                                data.with(|d| {
                                    d.milestones
                                        .iter()
                                        .filter(|m| m.date == date)
                                        .cloned()
                                        .collect::<Vec<Milestone>>()
                                })
                            });
                            view! {
                                <DayCell
                                    project_id=main_project_id.clone()
                                    date=date
                                    x=x
                                    width=metrics.column_width
                                    items=items
                                    milestones=milestones
                                />
                            }
                        }
                    />
                </div>
                <div class="project-separator" style=format!("height: {}px;", metrics.border)></div>
                {move || {
                    lanes()
                        .into_iter()
                        .enumerate()
                        .map(|(index, lane)| {
                            let height = lane_heights
                                .get(index)
                                .copied()
                                .unwrap_or(metrics.sub_project_min_height);
                            view! {
                                <div class="sub-project-lane" style=format!("min-height: {}px;", height)>
                                    {lane
                                        .into_iter()
                                        .map(|sp| view! { <SubProjectBar sub_project=sp data=data days=days /> })
                                        .collect_view()}
                                </div>
                            }
                        })
                        .collect_view()
                }}
            </div>
        }
    });

    view! {
        <div class="project-row">
            <ProjectHeader project=project open=row.open />
            {body}
        </div>
    }
}

#[component]
fn ProjectHeader(project: Project, open: bool) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();
    let height = ctx.metrics().project_header_height;
    let id = project.id.clone();

    let on_toggle = {
        let id = id.clone();
        move |_| {
            if ctx.dnd.drag_just_ended_read.get_untracked() {
                return;
            }
            store_toggle_project(&store, &id);
        }
    };

    let on_add_sub_project = {
        let id = id.clone();
        move |ev: web_sys::MouseEvent| {
            ev.stop_propagation();
            let start = ctx.window.get_untracked().start.max(crate::app::today());
            let draft = SubProject::new(
                "",
                "New sub-project",
                id.clone(),
                start,
                start + Duration::days(NEW_SUB_PROJECT_DAYS - 1),
            );
            let coordinator = ctx.coordinator();
            ctx.settle("create sub-project", async move {
                coordinator.create(draft).await.map(|_| ())
            });
        }
    };

    let on_delete = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        let coordinator = ctx.coordinator();
        let id = id.clone();
        ctx.settle("delete project", async move { coordinator.delete::<Project>(&id).await });
    };

    view! {
        <div
            class="project-header"
            style=format!("height: {}px; border-left-color: {};", height, project.color)
            on:click=on_toggle
        >
            <span class="project-toggle">{if open { "▼" } else { "▶" }}</span>
            <span class="project-name">{project.name.clone()}</span>
            <button class="project-add-btn" on:click=on_add_sub_project>"+ Sub-project"</button>
            <button class="project-delete-btn" on:click=on_delete>"×"</button>
        </div>
    }
}

/// Sub-project bar with the day cells of its members underneath
#[component]
fn SubProjectBar(sub_project: SubProject, data: Signal<ProjectData>, days: VisibleDays) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let dnd = ctx.dnd;
    let metrics = ctx.metrics();
    let width = metrics.column_width;

    let left = move || {
        let window = ctx.window.get();
        (sub_project.start_date - window.start).num_days() as f64 * width
    };
    let bar_style = {
        let span = sub_project.span_days() as f64 * width;
        let color = sub_project.color.clone().unwrap_or_else(|| "#7f8c8d".to_string());
        move || format!(
            "left: {}px; width: {}px; height: {}px; background-color: {};",
            left(), span, metrics.sub_project_header_height, color
        )
    };

    let id = sub_project.id.clone();
    let (start, end) = (sub_project.start_date, sub_project.end_date);

    let on_delete = {
        let id = id.clone();
        move |ev: web_sys::MouseEvent| {
            ev.stop_propagation();
            let delete_items = web_sys::window()
                .and_then(|w| w.confirm_with_message("Also delete the items inside?").ok())
                .unwrap_or(false);
            let policy = if delete_items { ChildPolicy::DeleteItems } else { ChildPolicy::KeepItems };
            let coordinator = ctx.coordinator();
            let id = id.clone();
            ctx.settle("delete sub-project", async move {
                coordinator.delete_sub_project(&id, policy).await
            });
        }
    };

    let bar_ref = NodeRef::<leptos::html::Div>::new();
    {
        let key = drag_id(EntityKind::SubProject, &id);
        Effect::new(move |_| {
            if let Some(el) = bar_ref.get() {
                animate_landing(&dnd, &key, &el);
            }
        });
    }

    let payload = DragPayload::SubProject(sub_project.clone());
    let cells_project_id = sub_project.project_id.clone();

    view! {
        <div
            node_ref=bar_ref
            class="sub-project-bar"
            style=bar_style
            title=sub_project.description.clone().unwrap_or_default()
            on:mousedown=make_on_mousedown(dnd, payload.clone())
            on:touchstart=make_on_touchstart(dnd, payload)
        >
            <span class="sub-project-title">{sub_project.title.clone()}</span>
            <button
                class="sub-project-delete-btn"
                on:mousedown=|ev: web_sys::MouseEvent| ev.stop_propagation()
                on:click=on_delete
            >
                "×"
            </button>
        </div>
        <For
            each=move || {
                days.get()
                    .into_iter()
                    .filter(|(_, date)| start <= *date && *date <= end)
                    .collect::<Vec<_>>()
            }
            key=|(x, date)| (x.to_bits(), *date)
            children=move |(x, date)| {
                let sp_id = id.clone();
                let member_id = id.clone();
                let items = Signal::derive(move || {
                    data.with(|d| {
                        d.members_of(&member_id)
                            .filter(|i| i.date == date)
                            .cloned()
                            .collect::<Vec<Item>>()
                    })
                });
                view! {
                    <DayCell
                        project_id=cells_project_id.clone()
                        sub_project_id=sp_id
                        date=date
                        x=x
                        width=width
                        items=items
                    />
                }
            }
        />
    }
}
