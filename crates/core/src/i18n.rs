//! Static UI string tables, one per supported [`Language`].

use crate::domain::Language;

pub const CAPTION_COUNT: usize = 4;

#[derive(Debug)]
pub struct Strings {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub hero_title: &'static str,
    pub hero_highlight: &'static str,
    pub hero_desc: &'static str,
    pub cat_label: &'static str,
    pub cat_placeholder: &'static str,
    pub budget_label: &'static str,
    pub budget_placeholder: &'static str,
    pub btn_start: &'static str,
    pub btn_loading: &'static str,
    pub market_overview: &'static str,
    pub rank: &'static str,
    pub value_prop: &'static str,
    pub key_specs: &'static str,
    pub compromises: &'static str,
    pub final_verdict: &'static str,
    pub ready: &'static str,
    pub ready_desc: &'static str,
    pub powered: &'static str,
    pub loading_steps: [&'static str; CAPTION_COUNT],
}

pub static EN: Strings = Strings {
    title: "ValueAnalyst",
    subtitle: "Scientific Methodology",
    hero_title: "Find the Best",
    hero_highlight: "Price-to-Performance",
    hero_desc: "Our AI uses real-time market data and scientific evaluation to recommend products that give you the absolute best return on your investment.",
    cat_label: "Product Category",
    cat_placeholder: "e.g. Mechanical Keyboards",
    budget_label: "Your Budget",
    budget_placeholder: "e.g. Under $150",
    btn_start: "Start Analysis",
    btn_loading: "Analyzing Market...",
    market_overview: "Market Overview",
    rank: "Rank",
    value_prop: "Value Proposition",
    key_specs: "Key Specs",
    compromises: "Compromises",
    final_verdict: "Final Verdict",
    ready: "Ready for Analysis",
    ready_desc: "Enter a category and budget above to see the best value products on the market today.",
    powered: "Powered by Gemini 3 Flash & Real-Time Google Search Grounding",
    loading_steps: [
        "Searching latest market data...",
        "Identifying key performance metrics...",
        "Calculating price-to-performance scores...",
        "Finalizing expert recommendations...",
    ],
};

pub static MY: Strings = Strings {
    title: "တန်ဖိုးဆန်းစစ်သူ",
    subtitle: "သိပ္ပံနည်းကျ ဆန်းစစ်မှု",
    hero_title: "အကောင်းဆုံး",
    hero_highlight: "ဈေးနှုန်းနှင့် စွမ်းဆောင်ရည်",
    hero_desc: "ကျွန်ုပ်တို့၏ AI သည် လက်ရှိဈေးကွက်အချက်အလက်များနှင့် သိပ္ပံနည်းကျ အကဲဖြတ်မှုများကို အသုံးပြု၍ သင့်အတွက် အကျိုးအမြတ်အများဆုံးရရှိမည့် ထုတ်ကုန်များကို အကြံပြုပေးပါသည်။",
    cat_label: "ထုတ်ကုန်အမျိုးအစား",
    cat_placeholder: "ဥပမာ - ကီးဘုတ်များ",
    budget_label: "သင့်ဘတ်ဂျက်",
    budget_placeholder: "ဥပမာ - ၁၅၀ ဒေါ်လာအောက်",
    btn_start: "ဆန်းစစ်မှုစတင်ရန်",
    btn_loading: "ဆန်းစစ်နေသည်...",
    market_overview: "ဈေးကွက်အခြေအနေ",
    rank: "အဆင့်",
    value_prop: "တန်ဖိုးရှိပုံ",
    key_specs: "အဓိကအချက်အလက်များ",
    compromises: "အားနည်းချက်များ",
    final_verdict: "နောက်ဆုံးသုံးသပ်ချက်",
    ready: "ဆန်းစစ်ရန် အဆင်သင့်ဖြစ်ပါပြီ",
    ready_desc: "ယနေ့ဈေးကွက်တွင် အကောင်းဆုံးတန်ဖိုးရှိသော ထုတ်ကုန်များကို ကြည့်ရှုရန် အထက်တွင် အမျိုးအစားနှင့် ဘတ်ဂျက်ကို ထည့်သွင်းပါ။",
    powered: "Gemini 3 Flash နှင့် Real-Time Google Search Grounding တို့ဖြင့် ပံ့ပိုးထားပါသည်",
    loading_steps: [
        "နောက်ဆုံးပေါ် ဈေးကွက်အချက်အလက်များကို ရှာဖွေနေသည်...",
        "အဓိက စွမ်းဆောင်ရည် အချက်အလက်များကို ခွဲခြားနေသည်...",
        "ဈေးနှုန်းနှင့် စွမ်းဆောင်ရည် ရမှတ်များကို တွက်ချက်နေသည်...",
        "ကျွမ်းကျင်သူ အကြံပြုချက်များကို အချောသတ်နေသည်...",
    ],
};

pub fn strings(language: Language) -> &'static Strings {
    match language {
        Language::English => &EN,
        Language::Myanmar => &MY,
    }
}

impl Strings {
    /// Caption for a loading step; steps wrap around.
    pub fn caption(&self, step: usize) -> &'static str {
        self.loading_steps[step % CAPTION_COUNT]
    }
}
