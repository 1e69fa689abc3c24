use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ControlsPanelProps {
    pub on_merge: Callback<()>,
    pub on_evolve: Callback<()>,
    pub on_delete: Callback<()>,
    pub on_reset: Callback<()>,
    pub feedback: Option<String>,
}

#[function_component]
pub fn ControlsPanel(props: &ControlsPanelProps) -> Html {
    let merge_cb = {
        let cb = props.on_merge.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let evolve_cb = {
        let cb = props.on_evolve.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let delete_cb = {
        let cb = props.on_delete.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let reset_cb = {
        let cb = props.on_reset.clone();
        Callback::from(move |_| {
            if let Some(win) = web_sys::window() {
                if win
                    .confirm_with_message("Really reset the game? All monsters and coins will be lost.")
                    .unwrap_or(false)
                {
                    cb.emit(());
                }
            }
        })
    };
    html! {<div style="background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; min-width:200px; display:flex; flex-direction:column; gap:6px;">
        <button onclick={merge_cb}>{"Merge"}</button>
        <button onclick={evolve_cb}>{"Evolve"}</button>
        <button onclick={delete_cb}>{"Delete"}</button>
        <button onclick={reset_cb} style="background:#f85149; border:1px solid #b62324; color:#fff;">{"Reset Game"}</button>
        <div style="font-size:11px; opacity:0.7;">{"Click slots to select; otherwise you will be asked for slot numbers"}</div>
        { if let Some(txt) = &props.feedback { if !txt.is_empty() { html!{ <div style="font-size:11px; line-height:1.2; background:#1c2128; border:1px solid #30363d; padding:4px 6px; border-radius:6px;">{ txt.clone() }</div> } } else { html!{} } } else { html!{} } }
    </div>}
}
