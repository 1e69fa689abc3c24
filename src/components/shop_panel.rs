use yew::prelude::*;

use crate::model::Attribute;

#[derive(Properties, PartialEq, Clone)]
pub struct ShopPanelProps {
    pub price: u64,
    pub stone_price: u64,
    pub occupied: usize,
    pub on_buy_monster: Callback<()>,
    pub on_buy_stone: Callback<Attribute>,
}

#[function_component]
pub fn ShopPanel(props: &ShopPanelProps) -> Html {
    let buy_cb = {
        let cb = props.on_buy_monster.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let stones = Attribute::ALL.into_iter().map(|attr| {
        let cb = props.on_buy_stone.clone();
        let onclick = Callback::from(move |_| cb.emit(attr));
        html! {
            <button {onclick} title={format!("{} stone", attr)}>
                { format!("{} {}", attr.glyph(), props.stone_price) }
            </button>
        }
    });
    html! {<div style="background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; min-width:200px; display:flex; flex-direction:column; gap:6px;">
        <div style="font-weight:600;">{"Shop"}</div>
        <button onclick={buy_cb}>{ format!("Buy Monster ({})", props.price) }</button>
        <div style="font-size:11px; opacity:0.7;">{ format!("Available: {}", props.occupied) }</div>
        <div style="display:flex; gap:4px; flex-wrap:wrap;">{ for stones }</div>
    </div>}
}
