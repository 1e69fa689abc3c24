use yew::prelude::*;

use crate::model::MonsterInstance;

#[derive(Properties, PartialEq, Clone)]
pub struct SlotBoardProps {
    pub slots: Vec<Option<MonsterInstance>>,
    pub selected: Vec<usize>,
    pub on_select: Callback<usize>,
}

#[function_component]
pub fn SlotBoard(props: &SlotBoardProps) -> Html {
    let frames = props.slots.iter().enumerate().map(|(i, slot)| {
        let onclick = {
            let cb = props.on_select.clone();
            Callback::from(move |_| cb.emit(i))
        };
        let border = match props.selected.iter().position(|s| *s == i) {
            Some(0) => "#f0883e",
            Some(_) => "#58a6ff",
            None => "#30363d",
        };
        let style = format!(
            "position:relative; width:96px; height:96px; background:#161b22; border:2px solid {}; border-radius:8px; display:flex; align-items:center; justify-content:center; cursor:pointer;",
            border
        );
        html! {
            <div id={format!("frame{}", i)} {style} {onclick}>
                <span style="position:absolute; top:2px; left:6px; font-size:11px; opacity:0.6;">{ i }</span>
                { match slot {
                    Some(m) => html!{ <>
                        <img src={m.texture.clone()} alt={m.source_id().to_string()} style="max-width:72px; max-height:72px;" />
                        <span style="position:absolute; bottom:2px; right:6px; font-size:11px; font-weight:600;">{ m.power }</span>
                        { if let Some(attr) = m.attribute {
                            html!{ <span style="position:absolute; top:2px; right:6px; font-size:12px;">{ attr.glyph() }</span> }
                        } else { html!{} } }
                    </> },
                    None => html!{},
                } }
            </div>
        }
    });
    html! {
        <div style="display:grid; grid-template-columns:repeat(4, 96px); gap:10px;">
            { for frames }
        </div>
    }
}
