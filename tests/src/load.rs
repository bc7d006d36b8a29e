use crate::util::*;

use obj::Obj;

#[test]
fn loaded_words_land_at_origin() {
    let origin = 0x4000;
    let words = vec![0x1234, 0x0000, 0xffff, 0x8000];

    let mut bytes = Vec::new();
    Obj { origin, words: words.clone() }.write_to(&mut bytes).unwrap();
    let parsed = Obj::read_from(&mut bytes.as_slice()).unwrap();

    let mut m = machine();
    m.emu.load_obj(&parsed);

    for (i, word) in words.iter().enumerate() {
        assert_eq!(m.emu.state().mem_read(origin + i as u16), *word);
    }
    // Neighbors stay zero.
    assert_eq!(m.emu.state().mem_read(origin - 1), 0);
    assert_eq!(m.emu.state().mem_read(origin + words.len() as u16), 0);
}

// An image whose last word sits at the very top of memory is valid and
// must load without incident.
#[test]
fn image_may_end_at_top_of_memory() {
    let mut m = machine();
    m.emu.load_obj(&Obj { origin: 0xffff, words: vec![7] });
    assert_eq!(m.emu.state().mem_read(0xffff), 7);

    let mut m = machine();
    m.emu.load_obj(&Obj { origin: 0xfffe, words: vec![1, 2] });
    assert_eq!(m.emu.state().mem_read(0xfffe), 1);
    assert_eq!(m.emu.state().mem_read(0xffff), 2);
}

#[test]
fn later_image_overwrites_earlier() {
    let mut m = machine();
    m.emu.load_obj(&Obj { origin: 0x4000, words: vec![1, 2, 3] });
    m.emu.load_obj(&Obj { origin: 0x4001, words: vec![9] });

    assert_eq!(m.emu.state().mem_read(0x4000), 1);
    assert_eq!(m.emu.state().mem_read(0x4001), 9);
    assert_eq!(m.emu.state().mem_read(0x4002), 3);
}
