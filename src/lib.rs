pub mod catalog;
pub mod deck;
pub mod filters;
pub mod gesture;
pub mod storage;

use catalog::{DiscoverQuery, Movie};
use deck::{DeckAction, DeckState, FetchKind};
use filters::{FilterState, LikedViewFilter, YEAR_FLOOR};
use gesture::{DragState, SwipeOutcome};
use log::warn;
use storage::LikedStore;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlImageElement, HtmlInputElement};
use yew::prelude::*;

const LOAD_ERROR_MESSAGE: &str = "Failed to load movies. Please try again later.";

/// Issues one catalog fetch and feeds the result back into the deck.
/// Callers are responsible for dropping the request when one is already
/// in flight.
fn start_fetch(
    deck: UseReducerHandle<DeckState>,
    kind: FetchKind,
    page: u32,
    filters: FilterState,
    load_error: UseStateHandle<Option<String>>,
) {
    deck.dispatch(DeckAction::FetchStarted { kind });

    spawn_local(async move {
        let query = DiscoverQuery {
            page,
            genres: filters.genres,
            year_from: filters.year_from,
            year_to: filters.year_to,
        };
        match catalog::discover(&query).await {
            Ok(movies) => {
                if kind == FetchKind::Replace {
                    load_error.set(None);
                }
                deck.dispatch(DeckAction::FetchCompleted { kind, page, movies });
            }
            Err(err) => {
                warn!("Catalog fetch failed: {}", err);
                // Backfill failures stay silent; the queue just stops
                // growing until the next request.
                if kind == FetchKind::Replace {
                    load_error.set(Some(LOAD_ERROR_MESSAGE.to_owned()));
                }
                deck.dispatch(DeckAction::FetchFailed);
            }
        }
    });
}

fn apply_filter_change(
    deck: &UseReducerHandle<DeckState>,
    filters: &UseStateHandle<FilterState>,
    load_error: &UseStateHandle<Option<String>>,
    next: FilterState,
) {
    filters.set(next.clone());
    if deck.fetch_pending() {
        // At most one fetch in flight: latch the change and replace the
        // queue once the current fetch settles.
        deck.dispatch(DeckAction::FiltersDirty);
    } else {
        start_fetch(
            deck.clone(),
            FetchKind::Replace,
            1,
            next,
            load_error.clone(),
        );
    }
}

#[function_component(App)]
fn app() -> Html {
    let current_year = js_sys::Date::new_0().get_full_year() as i32;

    let liked = use_state(LikedStore::load);
    let deck = {
        let seen = liked.ids();
        use_reducer(move || DeckState::with_seen(seen))
    };
    let filters = use_state(move || FilterState::new(current_year));
    let liked_filter = use_state(LikedViewFilter::default);
    let drag = use_state(|| None::<DragState>);
    let load_error = use_state(|| None::<String>);
    let filter_sidebar_open = use_state(|| false);
    let liked_sidebar_open = use_state(|| false);

    {
        let deck = deck.clone();
        let filters = filters.clone();
        let load_error = load_error.clone();

        use_effect_with_deps(
            move |_| {
                start_fetch(
                    deck,
                    FetchKind::Replace,
                    1,
                    (*filters).clone(),
                    load_error,
                );
                || ()
            },
            (),
        );
    }

    {
        let deck = deck.clone();
        let filters = filters.clone();
        let load_error = load_error.clone();
        let settled = (deck.fetch_pending(), deck.filters_dirty());

        use_effect_with_deps(
            move |_| {
                if deck.deferred_replace_due() {
                    start_fetch(
                        deck.clone(),
                        FetchKind::Replace,
                        1,
                        (*filters).clone(),
                        load_error.clone(),
                    );
                }
                || ()
            },
            settled,
        );
    }

    let on_swipe = {
        let deck = deck.clone();
        let liked = liked.clone();
        let filters = filters.clone();
        let load_error = load_error.clone();

        Callback::from(move |(movie, outcome): (Movie, SwipeOutcome)| {
            let backfill_due = deck.backfill_due_after_swipe();
            let next_page = deck.page() + 1;

            if outcome == SwipeOutcome::Like {
                let mut store = (*liked).clone();
                if store.add(movie.clone()) {
                    store.save();
                    liked.set(store);
                }
            }
            deck.dispatch(DeckAction::Swiped { id: movie.id });

            if backfill_due {
                start_fetch(
                    deck.clone(),
                    FetchKind::Backfill,
                    next_page,
                    (*filters).clone(),
                    load_error.clone(),
                );
            }
        })
    };

    // Explicit like/pass buttons act on the top card.
    let on_button = {
        let deck = deck.clone();
        let on_swipe = on_swipe.clone();
        Callback::from(move |outcome: SwipeOutcome| {
            if let Some(movie) = deck.top().cloned() {
                on_swipe.emit((movie, outcome));
            }
        })
    };

    let on_toggle_genre = {
        let deck = deck.clone();
        let filters = filters.clone();
        let load_error = load_error.clone();
        Callback::from(move |name: String| {
            let mut next = (*filters).clone();
            next.toggle_genre(&name);
            apply_filter_change(&deck, &filters, &load_error, next);
        })
    };

    let on_year_from = {
        let deck = deck.clone();
        let filters = filters.clone();
        let load_error = load_error.clone();
        Callback::from(move |year: i32| {
            let mut next = (*filters).clone();
            next.set_year_from(year);
            apply_filter_change(&deck, &filters, &load_error, next);
        })
    };

    let on_year_to = {
        let deck = deck.clone();
        let filters = filters.clone();
        let load_error = load_error.clone();
        Callback::from(move |year: i32| {
            let mut next = (*filters).clone();
            next.set_year_to(year);
            apply_filter_change(&deck, &filters, &load_error, next);
        })
    };

    let on_dismiss_liked = {
        let deck = deck.clone();
        let liked = liked.clone();
        let filters = filters.clone();
        let load_error = load_error.clone();
        Callback::from(move |id: u64| {
            let mut store = (*liked).clone();
            if store.remove(id) {
                store.save();
                liked.set(store);
            }
            // The movie is no longer seen, so refresh the queue; it may
            // come back.
            deck.dispatch(DeckAction::Unseen { id });
            if !deck.fetch_pending() {
                start_fetch(
                    deck.clone(),
                    FetchKind::Replace,
                    1,
                    (*filters).clone(),
                    load_error.clone(),
                );
            }
        })
    };

    let on_reset = {
        let deck = deck.clone();
        let liked = liked.clone();
        let filters = filters.clone();
        let load_error = load_error.clone();
        Callback::from(move |_: MouseEvent| {
            let store = LikedStore::new();
            store.save();
            liked.set(store);
            deck.dispatch(DeckAction::ResetSeen);
            if !deck.fetch_pending() {
                start_fetch(
                    deck.clone(),
                    FetchKind::Replace,
                    1,
                    (*filters).clone(),
                    load_error.clone(),
                );
            }
        })
    };

    let on_retry = {
        let deck = deck.clone();
        let filters = filters.clone();
        let load_error = load_error.clone();
        Callback::from(move |_: MouseEvent| {
            if !deck.fetch_pending() {
                start_fetch(
                    deck.clone(),
                    FetchKind::Replace,
                    1,
                    (*filters).clone(),
                    load_error.clone(),
                );
            }
        })
    };

    let open_filters = {
        let filter_sidebar_open = filter_sidebar_open.clone();
        Callback::from(move |_: MouseEvent| filter_sidebar_open.set(true))
    };
    let close_filters = {
        let filter_sidebar_open = filter_sidebar_open.clone();
        Callback::from(move |_: MouseEvent| filter_sidebar_open.set(false))
    };
    let open_liked = {
        let liked_sidebar_open = liked_sidebar_open.clone();
        Callback::from(move |_: MouseEvent| liked_sidebar_open.set(true))
    };
    let close_liked = {
        let liked_sidebar_open = liked_sidebar_open.clone();
        Callback::from(move |_: MouseEvent| liked_sidebar_open.set(false))
    };

    let has_cards = !deck.queue().is_empty();

    html! {
        <div class="swipe-interface">
            { render_filter_sidebar(
                *filter_sidebar_open,
                &filters,
                current_year,
                close_filters,
                on_toggle_genre,
                on_year_from,
                on_year_to,
            ) }
            { render_liked_sidebar(
                *liked_sidebar_open,
                &liked,
                &liked_filter,
                close_liked,
                on_dismiss_liked,
            ) }

            <header class="top-bar">
                <button class="filter-button" onclick={open_filters}>{ "Filters" }</button>
                <div class="brand">
                    <h1 class="logo">{ "Movit" }</h1>
                    <p class="tagline">{ "Discover your next favorite movie" }</p>
                </div>
                <button class="liked-button" onclick={open_liked}>
                    { format!("Liked ({})", liked.len()) }
                </button>
            </header>

            <main class="card-area">
                { render_card_stack(&deck, &drag, &load_error, &on_swipe, &on_reset, &on_retry) }
                {
                    if has_cards {
                        let pass = {
                            let on_button = on_button.clone();
                            Callback::from(move |_: MouseEvent| on_button.emit(SwipeOutcome::Pass))
                        };
                        let like = {
                            let on_button = on_button.clone();
                            Callback::from(move |_: MouseEvent| on_button.emit(SwipeOutcome::Like))
                        };
                        html! {
                            <div class="action-buttons">
                                <button class="pass-button" onclick={pass}>{ "✕" }</button>
                                <button class="like-button" onclick={like}>{ "♥" }</button>
                            </div>
                        }
                    } else {
                        html! {}
                    }
                }
            </main>
        </div>
    }
}

fn render_filter_sidebar(
    open: bool,
    filters: &UseStateHandle<FilterState>,
    current_year: i32,
    on_close: Callback<MouseEvent>,
    on_toggle_genre: Callback<String>,
    on_year_from: Callback<i32>,
    on_year_to: Callback<i32>,
) -> Html {
    let overlay_classes = classes!("sidebar-overlay", open.then_some("open"));
    let panel_classes = classes!("sidebar", "left-sidebar", open.then_some("open"));

    let year_display = if filters.year_from == filters.year_to {
        filters.year_from.to_string()
    } else {
        format!("{} – {}", filters.year_from, filters.year_to)
    };

    let from_input = {
        let on_year_from = on_year_from.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            if let Ok(year) = input.value().parse::<i32>() {
                on_year_from.emit(year);
            }
        })
    };
    let to_input = {
        let on_year_to = on_year_to.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            if let Ok(year) = input.value().parse::<i32>() {
                on_year_to.emit(year);
            }
        })
    };

    let genre_buttons = catalog::available_genres().into_iter().map(|name| {
        let active = filters.is_selected(name);
        let onclick = {
            let on_toggle_genre = on_toggle_genre.clone();
            let name = name.to_owned();
            Callback::from(move |_: MouseEvent| on_toggle_genre.emit(name.clone()))
        };
        html! {
            <button key={name}
                class={classes!("genre-tag", active.then_some("active"))}
                {onclick}>
                { name }
            </button>
        }
    });

    html! {
        <>
            <div class={overlay_classes} onclick={on_close.clone()}></div>
            <aside class={panel_classes}>
                <button class="sidebar-close" onclick={on_close}>{ "×" }</button>
                <div class="sidebar-header">
                    <h2 class="sidebar-title">{ "Filters" }</h2>
                </div>

                <div class="filter-section">
                    <h3 class="filter-section-title">{ "Release Year" }</h3>
                    <div class="year-value-display">{ year_display }</div>
                    <div class="dual-range-slider">
                        <input type="range"
                            min={YEAR_FLOOR.to_string()}
                            max={current_year.to_string()}
                            value={filters.year_from.to_string()}
                            oninput={from_input.clone()} />
                        <input type="range"
                            min={YEAR_FLOOR.to_string()}
                            max={current_year.to_string()}
                            value={filters.year_to.to_string()}
                            oninput={to_input.clone()} />
                    </div>
                    <div class="year-range-inputs">
                        <input type="number"
                            min={YEAR_FLOOR.to_string()}
                            max={current_year.to_string()}
                            value={filters.year_from.to_string()}
                            oninput={from_input} />
                        <span class="range-separator">{ "–" }</span>
                        <input type="number"
                            min={YEAR_FLOOR.to_string()}
                            max={current_year.to_string()}
                            value={filters.year_to.to_string()}
                            oninput={to_input} />
                    </div>
                </div>

                <div class="filter-section">
                    <h3 class="filter-section-title">{ "Genres" }</h3>
                    <div class="genre-filters">{ for genre_buttons }</div>
                </div>
            </aside>
        </>
    }
}

fn render_liked_sidebar(
    open: bool,
    liked: &UseStateHandle<LikedStore>,
    liked_filter: &UseStateHandle<LikedViewFilter>,
    on_close: Callback<MouseEvent>,
    on_dismiss: Callback<u64>,
) -> Html {
    let overlay_classes = classes!("sidebar-overlay", open.then_some("open"));
    let panel_classes = classes!("sidebar", "right-sidebar", open.then_some("open"));

    let mut genres: Vec<String> = liked
        .movies()
        .iter()
        .flat_map(|movie| movie.genres.iter().cloned())
        .collect();
    genres.sort();
    genres.dedup();

    let genre_buttons = genres.into_iter().map(|name| {
        let active = liked_filter.is_selected(&name);
        let onclick = {
            let liked_filter = liked_filter.clone();
            let name = name.clone();
            Callback::from(move |_: MouseEvent| {
                let mut next = (*liked_filter).clone();
                next.toggle_genre(&name);
                liked_filter.set(next);
            })
        };
        html! {
            <button key={name.clone()}
                class={classes!("genre-tag", active.then_some("active"))}
                {onclick}>
                { name }
            </button>
        }
    });

    let from_input = {
        let liked_filter = liked_filter.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let mut next = (*liked_filter).clone();
            next.year_from = input.value().parse::<i32>().ok();
            liked_filter.set(next);
        })
    };
    let to_input = {
        let liked_filter = liked_filter.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let mut next = (*liked_filter).clone();
            next.year_to = input.value().parse::<i32>().ok();
            liked_filter.set(next);
        })
    };

    let visible = liked.filtered(liked_filter);
    let entries = visible.into_iter().map(|movie| {
        let dismiss = {
            let on_dismiss = on_dismiss.clone();
            let id = movie.id;
            Callback::from(move |_: MouseEvent| on_dismiss.emit(id))
        };
        html! {
            <div key={movie.id.to_string()} class="liked-movie-item">
                <img src={movie.poster.clone()} alt={movie.title.clone()} />
                <div class="movie-details">
                    <h4>{ &movie.title }</h4>
                    <span>{ format!("{} • {}", movie.year_label(), movie.genre) }</span>
                </div>
                <button class="dismiss-button" onclick={dismiss} title="Remove from liked">
                    { "×" }
                </button>
            </div>
        }
    });

    let body = if liked.is_empty() {
        html! {
            <div class="empty-likes">
                <p>{ "No liked movies yet!" }</p>
                <p>{ "Start swiping to add some favorites." }</p>
            </div>
        }
    } else {
        html! { <div class="liked-movies-list">{ for entries }</div> }
    };

    html! {
        <>
            <div class={overlay_classes} onclick={on_close.clone()}></div>
            <aside class={panel_classes}>
                <button class="sidebar-close" onclick={on_close}>{ "×" }</button>
                <div class="sidebar-header">
                    <h2 class="sidebar-title">{ format!("Liked Movies ({})", liked.len()) }</h2>
                </div>

                <div class="filter-section">
                    <h3 class="filter-section-title">{ "Show years" }</h3>
                    <div class="year-range-inputs">
                        <input type="number" placeholder="from"
                            value={liked_filter.year_from.map(|y| y.to_string()).unwrap_or_default()}
                            oninput={from_input} />
                        <span class="range-separator">{ "–" }</span>
                        <input type="number" placeholder="to"
                            value={liked_filter.year_to.map(|y| y.to_string()).unwrap_or_default()}
                            oninput={to_input} />
                    </div>
                    <div class="genre-filters">{ for genre_buttons }</div>
                </div>

                { body }
            </aside>
        </>
    }
}

fn render_card_stack(
    deck: &UseReducerHandle<DeckState>,
    drag: &UseStateHandle<Option<DragState>>,
    load_error: &UseStateHandle<Option<String>>,
    on_swipe: &Callback<(Movie, SwipeOutcome)>,
    on_reset: &Callback<MouseEvent>,
    on_retry: &Callback<MouseEvent>,
) -> Html {
    if let Some(message) = (**load_error).as_ref() {
        return html! {
            <div class="no-more-cards">
                <p class="error">{ message }</p>
                <button class="reset-button" onclick={on_retry.clone()}>{ "Try Again" }</button>
            </div>
        };
    }

    if deck.queue().is_empty() {
        if deck.fetch_pending() {
            return html! { <div class="loading">{ "Loading movies…" }</div> };
        }
        return html! {
            <div class="no-more-cards">
                <h2>{ "No more movies!" }</h2>
                <p>{ "You've seen everything matching your filters." }</p>
                <button class="reset-button" onclick={on_reset.clone()}>{ "Start Over" }</button>
            </div>
        };
    }

    let cards = deck.queue().iter().take(3).enumerate().map(|(index, movie)| {
        if index == 0 {
            render_top_card(movie.clone(), drag, on_swipe)
        } else {
            render_stacked_card(movie, index)
        }
    });

    html! { <div class="card-stack">{ for cards }</div> }
}

/// The interactive front card: pointer-driven drag with capture, live
/// like/pass indicator, swipe commit on release.
fn render_top_card(
    movie: Movie,
    drag: &UseStateHandle<Option<DragState>>,
    on_swipe: &Callback<(Movie, SwipeOutcome)>,
) -> Html {
    let (delta_x, delta_y, dragging) = match (**drag).as_ref() {
        Some(state) => (state.delta_x(), state.delta_y(), true),
        None => (0.0, 0.0, false),
    };
    let style = format!(
        "{} z-index: 10;",
        gesture::card_transform(delta_x, delta_y, dragging)
    );
    let indicator_class = (**drag).as_ref().and_then(|state| {
        state.indicator().map(|outcome| match outcome {
            SwipeOutcome::Like => "like",
            SwipeOutcome::Pass => "pass",
        })
    });

    let pointer_down = {
        let drag = drag.clone();
        Callback::from(move |event: PointerEvent| {
            event.prevent_default();
            if drag.is_some() {
                return;
            }
            if let Some(target) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
            {
                let _ = target.set_pointer_capture(event.pointer_id());
            }
            drag.set(Some(DragState::new(
                event.pointer_id(),
                event.client_x() as f64,
                event.client_y() as f64,
            )));
        })
    };

    let pointer_move = {
        let drag = drag.clone();
        Callback::from(move |event: PointerEvent| {
            if let Some(mut state) = (*drag).clone() {
                if state.pointer_id == event.pointer_id() {
                    event.prevent_default();
                    state.update(event.client_x() as f64, event.client_y() as f64);
                    drag.set(Some(state));
                }
            }
        })
    };

    let pointer_up = {
        let drag = drag.clone();
        let on_swipe = on_swipe.clone();
        let movie = movie.clone();
        Callback::from(move |event: PointerEvent| {
            if let Some(state) = (*drag).clone() {
                if state.pointer_id == event.pointer_id() {
                    if let Some(target) = event
                        .target()
                        .and_then(|t| t.dyn_into::<Element>().ok())
                    {
                        let _ = target.release_pointer_capture(event.pointer_id());
                    }
                    if let Some(outcome) = state.classify_release() {
                        on_swipe.emit((movie.clone(), outcome));
                    }
                    // Below the threshold the card snaps back to neutral.
                    drag.set(None);
                }
            }
        })
    };

    let pointer_cancel = {
        let drag = drag.clone();
        Callback::from(move |event: PointerEvent| {
            if let Some(state) = (*drag).clone() {
                if state.pointer_id == event.pointer_id() {
                    if let Some(target) = event
                        .target()
                        .and_then(|t| t.dyn_into::<Element>().ok())
                    {
                        let _ = target.release_pointer_capture(event.pointer_id());
                    }
                    drag.set(None);
                }
            }
        })
    };

    html! {
        <div key={movie.id.to_string()}
            class={classes!("swipe-card", "top", indicator_class)}
            style={style}
            onpointerdown={pointer_down}
            onpointermove={pointer_move}
            onpointerup={pointer_up}
            onpointercancel={pointer_cancel}>
            { render_card_body(&movie) }
        </div>
    }
}

fn render_stacked_card(movie: &Movie, index: usize) -> Html {
    let style = format!(
        "z-index: {}; opacity: 0.8; transform: scale(0.95) translateY({}px);",
        10 - index,
        index * 8
    );
    html! {
        <div key={movie.id.to_string()} class="swipe-card" style={style}>
            { render_card_body(movie) }
        </div>
    }
}

fn render_card_body(movie: &Movie) -> Html {
    let placeholder = format!(
        "https://via.placeholder.com/300x450/666666/ffffff?text={}",
        String::from(js_sys::encode_uri_component(&movie.title))
    );
    let on_image_error = Callback::from(move |event: Event| {
        if let Some(image) = event
            .target()
            .and_then(|t| t.dyn_into::<HtmlImageElement>().ok())
        {
            image.set_src(&placeholder);
        }
    });

    // Text selection and scrolling inside the synopsis must not move the
    // card.
    let swallow_pointer = Callback::from(|event: PointerEvent| event.stop_propagation());
    let swallow_wheel = Callback::from(|event: WheelEvent| event.stop_propagation());

    let genre_chips = if movie.genres.is_empty() {
        html! { <span class="card-genre">{ &movie.genre }</span> }
    } else {
        html! {
            { for movie.genres.iter().map(|genre| html! {
                <span key={genre.clone()} class="card-genre">{ genre }</span>
            }) }
        }
    };

    html! {
        <>
            <div class="card-image">
                <img src={movie.poster.clone()} alt={movie.title.clone()} onerror={on_image_error} />
                <div class="swipe-indicator like-indicator">{ "LIKE" }</div>
                <div class="swipe-indicator pass-indicator">{ "NOPE" }</div>
            </div>
            <div class="card-info">
                <div class="card-header">
                    <h2>{ &movie.title }</h2>
                    <span class="card-year">{ movie.year_label() }</span>
                </div>
                <div class="card-details">
                    <div class="card-genres">{ genre_chips }</div>
                    <div class="card-rating">
                        <span class="rating-stars">{ "⭐" }</span>
                        <span>{ format!("{}/10", movie.rating) }</span>
                    </div>
                </div>
                <p class="card-description"
                    onpointerdown={swallow_pointer}
                    onwheel={swallow_wheel}>
                    { &movie.description }
                </p>
            </div>
        </>
    }
}

#[wasm_bindgen(start)]
pub fn run_app() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<App>::new().render();
}
