//! Timeline Grid Component
//!
//! Scroll container over the whole grid. Only the workspace rows and day
//! columns near the viewport are mounted; both windows are recomputed from
//! the engine virtualizers on scroll and whenever the row inputs change.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use timeline_engine::virtualize::{DayColumns, RowInputs, RowVirtualizer, WorkspaceRow};

use crate::components::{VisibleDays, WorkspaceRowView};
use crate::context::AppContext;
use crate::store::use_app_store;

/// Height of the sticky date header above the rows
const DATE_HEADER_HEIGHT: f64 = 28.0;

/// Identity of a mounted row; changes whenever the row must re-render
fn row_key(start: f64, row: &WorkspaceRow) -> u64 {
    let mut hasher = DefaultHasher::new();
    start.to_bits().hash(&mut hasher);
    let ws = &row.workspace;
    (&ws.id, &ws.name, &ws.color, row.collapsed).hash(&mut hasher);
    for p in &row.projects {
        (&p.project.id, &p.project.name, &p.project.color, p.open).hash(&mut hasher);
        if let Some(h) = &p.expanded {
            h.main_row_height.to_bits().hash(&mut hasher);
            for lane in &h.sub_project_row_heights {
                lane.to_bits().hash(&mut hasher);
            }
        }
    }
    hasher.finish()
}

#[component]
pub fn TimelineGrid() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();
    let metrics = ctx.metrics();
    let column_width = metrics.column_width;
    let scroller = NodeRef::<leptos::html::Div>::new();

    let rows = StoredValue::new_local(RowVirtualizer::new(metrics.clone()));
    let columns = StoredValue::new_local(DayColumns::new(
        ctx.window.get_untracked(),
        column_width,
        metrics.overscan_columns,
    ));
    // Bumped after every virtualizer change
    let (layout_tick, set_layout_tick) = signal(0u64);
    let bump = move || set_layout_tick.update(|t| *t += 1);

    // Row estimate follows the store; a structural change is remeasured
    // once the browser has laid out the new rows
    Effect::new(move |_| {
        let scheduled = store.with(|state| {
            let inputs = RowInputs {
                structure: &state.structure,
                data: &state.data,
                open_projects: &state.open_projects,
                toggled_workspaces: &state.toggled_workspaces,
                measured_heights: &state.measured_heights,
                metrics: &metrics,
            };
            rows.try_update_value(|r| r.sync(&inputs)).unwrap_or(false)
        });
        bump();
        if scheduled {
            Timeout::new(0, move || {
                if rows.try_update_value(|r| r.after_layout()).unwrap_or(false) {
                    bump();
                }
            })
            .forget();
        }
    });

    Effect::new(move |_| {
        let window = ctx.window.get();
        columns.update_value(|c| c.set_window(window));
        bump();
    });

    let read_viewport = move || {
        let Some(el) = scroller.get_untracked() else { return };
        let (top, left) = (el.scroll_top() as f64, el.scroll_left() as f64);
        let (height, width) = (el.client_height() as f64, el.client_width() as f64);
        rows.update_value(|r| r.set_scroll(top, (height - DATE_HEADER_HEIGHT).max(0.0)));
        columns.update_value(|c| c.set_scroll(left, width));
        bump();
    };

    // First layout: take the viewport size and bring today into view
    Effect::new(move |_| {
        let Some(el) = scroller.get() else { return };
        let today_x = columns.with_value(|c| c.x_of(crate::app::today()));
        if today_x > 0.0 {
            el.set_scroll_left(today_x as i32);
        }
        read_viewport();
    });

    let days: VisibleDays = Memo::new(move |_| {
        layout_tick.track();
        columns.with_value(|c| {
            c.visible_days()
                .into_iter()
                .map(|(slot, date)| (slot.start, date))
                .collect::<Vec<(f64, NaiveDate)>>()
        })
    })
    .into();

    let virtual_rows = Memo::new(move |_| {
        layout_tick.track();
        rows.with_value(|r| {
            r.virtual_rows()
                .into_iter()
                .map(|(slot, row)| (slot.start, row.clone()))
                .collect::<Vec<(f64, WorkspaceRow)>>()
        })
    });
    let total_height = Memo::new(move |_| {
        layout_tick.track();
        rows.with_value(|r| r.total_height())
    });
    let total_width = Memo::new(move |_| {
        layout_tick.track();
        columns.with_value(|c| c.total_width())
    });

    view! {
        <div class="timeline-scroller" node_ref=scroller on:scroll=move |_| read_viewport()>
            <div
                class="timeline-date-header"
                style=move || format!("height: {}px; width: {}px;", DATE_HEADER_HEIGHT, total_width.get())
            >
                <For
                    each=move || days.get()
                    key=|(x, date)| (x.to_bits(), *date)
                    children=move |(x, date)| view! {
                        <div class="date-cell" style=format!("left: {}px; width: {}px;", x, column_width)>
                            {date.format("%a %d %b").to_string()}
                        </div>
                    }
                />
            </div>
            <div
                class="timeline-canvas"
                style=move || format!("height: {}px; width: {}px;", total_height.get(), total_width.get())
            >
                <For
                    each=move || virtual_rows.get()
                    key=|(start, row)| row_key(*start, row)
                    children=move |(start, row)| view! {
                        <div class="workspace-slot" style=format!("top: {}px;", start)>
                            <WorkspaceRowView row=row days=days />
                        </div>
                    }
                />
            </div>
        </div>
    }
}
