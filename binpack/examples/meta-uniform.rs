use binpack::{MetaPacker, MetaRect};

fn main() {
    env_logger::init();

    let mut rects: Vec<_> = (0..5).map(|_| MetaRect::new((128, 128))).collect();

    let mut packer = MetaPacker::new();
    let outcome = packer.pack(&mut rects);

    println!("Pack outcome: {:#?}", outcome);

    for rect in &rects {
        println!("{}: {:?}", rect.id(), rect.rect());
    }
}
