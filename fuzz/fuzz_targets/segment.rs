#![no_main]

use libfuzzer_sys::fuzz_target;

use talkify::speech::segment;

fuzz_target!(|text: &str| {
    let units = segment(text);
    let joined: String = units.iter().map(|unit| unit.text()).collect();
    assert_eq!(joined, text);
    for (index, unit) in units.iter().enumerate() {
        assert_eq!(unit.index(), index);
    }
});
