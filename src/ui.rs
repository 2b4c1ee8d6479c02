// UI layer: the numbered menu loop and one handler per action. Handlers
// read their input from a `Console`, call the server through
// `SmartHomeApi` and print the result. A failing request never ends the
// loop; only the exit option (or a broken console) does.

use std::io;

use log::warn;
use thiserror::Error;

use crate::api::SmartHomeApi;
use crate::console::Console;
use crate::error::ClientError;
use crate::model::{or_missing, yes_no, Action, Device, Routine};

const MENU_RULE: &str = "========================================";

/// Menu entries in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ListDevices,
    GetDevice,
    UpdateDevice,
    ExecuteAction,
    ListRoutines,
    CreateRoutine,
    ListAlerts,
    GetRoom,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 9] = [
        MenuChoice::ListDevices,
        MenuChoice::GetDevice,
        MenuChoice::UpdateDevice,
        MenuChoice::ExecuteAction,
        MenuChoice::ListRoutines,
        MenuChoice::CreateRoutine,
        MenuChoice::ListAlerts,
        MenuChoice::GetRoom,
        MenuChoice::Exit,
    ];

    pub fn parse(input: &str) -> Option<Self> {
        let choice = match input.trim() {
            "1" => MenuChoice::ListDevices,
            "2" => MenuChoice::GetDevice,
            "3" => MenuChoice::UpdateDevice,
            "4" => MenuChoice::ExecuteAction,
            "5" => MenuChoice::ListRoutines,
            "6" => MenuChoice::CreateRoutine,
            "7" => MenuChoice::ListAlerts,
            "8" => MenuChoice::GetRoom,
            "0" => MenuChoice::Exit,
            _ => return None,
        };
        Some(choice)
    }

    pub fn key(self) -> &'static str {
        match self {
            MenuChoice::ListDevices => "1",
            MenuChoice::GetDevice => "2",
            MenuChoice::UpdateDevice => "3",
            MenuChoice::ExecuteAction => "4",
            MenuChoice::ListRoutines => "5",
            MenuChoice::CreateRoutine => "6",
            MenuChoice::ListAlerts => "7",
            MenuChoice::GetRoom => "8",
            MenuChoice::Exit => "0",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::ListDevices => "Listar dispositivos",
            MenuChoice::GetDevice => "Obter dispositivo por ID",
            MenuChoice::UpdateDevice => "Atualizar dispositivo",
            MenuChoice::ExecuteAction => "Executar acao em dispositivo",
            MenuChoice::ListRoutines => "Listar rotinas",
            MenuChoice::CreateRoutine => "Criar rotina",
            MenuChoice::ListAlerts => "Listar alertas",
            MenuChoice::GetRoom => "Obter comodo por nome",
            MenuChoice::Exit => "Sair",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Running,
    Stopped,
}

/// Why a single action stopped early.
#[derive(Error, Debug)]
enum ActionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Console(#[from] io::Error),
}

type ActionResult = Result<(), ActionError>;

/// The interactive shell. Owns its client and console for the whole session.
pub struct Shell<A, C> {
    api: A,
    console: C,
    state: ShellState,
}

impl<A: SmartHomeApi, C: Console> Shell<A, C> {
    pub fn new(api: A, console: C) -> Self {
        Shell {
            api,
            console,
            state: ShellState::Running,
        }
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Runs until the exit option is chosen. Returns an error only when the
    /// console can no longer be read.
    pub fn run(&mut self) -> io::Result<()> {
        while self.state == ShellState::Running {
            self.show_menu();
            let input = self.console.read_line("Escolha uma opcao")?;
            self.dispatch(&input)?;

            if self.state == ShellState::Running {
                self.console.read_line("\nPressione Enter para continuar...")?;
            }
        }
        Ok(())
    }

    /// Handles one line of menu input.
    pub fn dispatch(&mut self, input: &str) -> io::Result<()> {
        let Some(choice) = MenuChoice::parse(input) else {
            self.console.write_line("");
            self.console.error("Opcao invalida! Tente novamente.");
            return Ok(());
        };

        let outcome = match choice {
            MenuChoice::ListDevices => self.list_devices(),
            MenuChoice::GetDevice => self.get_device(),
            MenuChoice::UpdateDevice => self.update_device(),
            MenuChoice::ExecuteAction => self.execute_action(),
            MenuChoice::ListRoutines => self.list_routines(),
            MenuChoice::CreateRoutine => self.create_routine(),
            MenuChoice::ListAlerts => self.list_alerts(),
            MenuChoice::GetRoom => self.get_room(),
            MenuChoice::Exit => {
                self.state = ShellState::Stopped;
                self.console.write_line("\nEncerrando cliente...");
                Ok(())
            }
        };

        match outcome {
            Ok(()) => Ok(()),
            Err(ActionError::Client(err)) => {
                match err.status() {
                    Some(status) => warn!("{} failed with HTTP {}", choice.label(), status),
                    None => warn!("{} failed: {}", choice.label(), err),
                }
                self.console.error(&err.to_string());
                Ok(())
            }
            Err(ActionError::Console(err)) => Err(err),
        }
    }

    fn show_menu(&mut self) {
        self.console.write_line(&format!("\n{MENU_RULE}"));
        self.console.write_line("MENU PRINCIPAL");
        self.console.write_line(MENU_RULE);
        for choice in MenuChoice::ALL {
            self.console
                .write_line(&format!("{}. {}", choice.key(), choice.label()));
        }
        self.console.write_line(MENU_RULE);
    }

    /// Prompts for a value that must not be empty. Prints `empty_error` and
    /// yields `None` when it is.
    fn require(&mut self, prompt: &str, empty_error: &str) -> io::Result<Option<String>> {
        let value = self.console.read_line(prompt)?;
        if value.is_empty() {
            self.console.error(empty_error);
            return Ok(None);
        }
        Ok(Some(value))
    }

    fn call<T>(
        &mut self,
        message: &str,
        request: impl FnOnce(&A) -> Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        self.console.busy(message);
        let result = request(&self.api);
        self.console.idle();
        result
    }

    fn print_device_detail(&mut self, device: &Device) {
        self.console
            .write_line(&format!("  Nome: {}", or_missing(&device.nome)));
        self.console
            .write_line(&format!("  ID: {}", or_missing(&device.id)));
        self.console
            .write_line(&format!("  Tipo: {}", or_missing(&device.tipo)));
        if let Some(descricao) = &device.descricao {
            self.console.write_line(&format!("  Descricao: {descricao}"));
        }
        self.console
            .write_line(&format!("  Online: {}", yes_no(device.online)));
        self.console
            .write_line(&format!("  Comodo: {}", or_missing(&device.comodo)));
    }

    fn list_devices(&mut self) -> ActionResult {
        self.console.write_line("\n--- Listando Dispositivos ---");
        let devices = self.call("Buscando dispositivos...", |api| api.list_devices())?;
        self.console
            .write_line(&format!("Total: {} dispositivos\n", devices.len()));

        if devices.is_empty() {
            self.console.write_line("Nenhum dispositivo encontrado.");
            return Ok(());
        }
        for (i, device) in devices.iter().enumerate() {
            self.console
                .write_line(&format!("{}. {}", i + 1, or_missing(&device.nome)));
            self.console
                .write_line(&format!("   ID: {}", or_missing(&device.id)));
            self.console
                .write_line(&format!("   Tipo: {}", or_missing(&device.tipo)));
            self.console
                .write_line(&format!("   Online: {}", yes_no(device.online)));
            self.console
                .write_line(&format!("   Comodo: {}", or_missing(&device.comodo)));
            self.console.write_line("");
        }
        Ok(())
    }

    fn get_device(&mut self) -> ActionResult {
        self.console.write_line("\n--- Obter Dispositivo ---");
        let Some(id) = self.require("Digite o ID do dispositivo", "ID nao pode ser vazio!")? else {
            return Ok(());
        };

        match self.call("Buscando dispositivo...", |api| api.get_device(&id))? {
            Some(device) => {
                self.console.write_line("\nDispositivo encontrado:");
                self.print_device_detail(&device);
            }
            None => {
                self.console.write_line("");
                self.console.error("Dispositivo nao encontrado!");
            }
        }
        Ok(())
    }

    /// Read-modify-write: fetch the device, apply the edits the operator
    /// typed (blank keeps the current value) and send it back whole.
    fn update_device(&mut self) -> ActionResult {
        self.console.write_line("\n--- Atualizar Dispositivo ---");
        let Some(id) = self.require("Digite o ID do dispositivo", "ID nao pode ser vazio!")? else {
            return Ok(());
        };

        let Some(mut device) = self.call("Buscando dispositivo...", |api| api.get_device(&id))?
        else {
            self.console.error("Dispositivo nao encontrado!");
            return Ok(());
        };

        self.console.write_line("\nDispositivo atual:");
        self.console
            .write_line(&format!("  Nome: {}", or_missing(&device.nome)));
        self.console
            .write_line(&format!("  Online: {}", yes_no(device.online)));

        let new_name = self.console.read_line("\nNovo nome (Enter para manter)")?;
        if !new_name.is_empty() {
            device.nome = Some(new_name);
        }

        let online = self
            .console
            .read_line("Online? (s/n, Enter para manter)")?
            .to_lowercase();
        match online.as_str() {
            "s" => device.online = true,
            "n" => device.online = false,
            _ => {}
        }

        match self.call("Atualizando dispositivo...", |api| {
            api.update_device(&id, &device)
        })? {
            Some(updated) => {
                self.console.write_line("");
                self.console.success("Dispositivo atualizado!");
                self.console
                    .write_line(&format!("  Nome: {}", or_missing(&updated.nome)));
                self.console
                    .write_line(&format!("  Online: {}", yes_no(updated.online)));
            }
            None => {
                self.console.write_line("");
                self.console.error("Falha ao atualizar dispositivo!");
            }
        }
        Ok(())
    }

    fn execute_action(&mut self) -> ActionResult {
        self.console.write_line("\n--- Executar Acao ---");
        let Some(id) = self.require("Digite o ID do dispositivo", "ID nao pode ser vazio!")? else {
            return Ok(());
        };
        let Some(command) = self.require(
            "Digite o comando (ligar/desligar)",
            "Comando nao pode ser vazio!",
        )?
        else {
            return Ok(());
        };

        match self.call("Executando acao...", |api| api.execute_action(&id, &command))? {
            Some(device) => {
                self.console.write_line("");
                self.console.success("Acao executada!");
                self.console
                    .write_line(&format!("  Dispositivo: {}", or_missing(&device.nome)));
                self.console
                    .write_line(&format!("  Online: {}", yes_no(device.online)));
            }
            None => {
                self.console.write_line("");
                self.console.error("Falha ao executar acao!");
            }
        }
        Ok(())
    }

    fn list_routines(&mut self) -> ActionResult {
        self.console.write_line("\n--- Listando Rotinas ---");
        let routines = self.call("Buscando rotinas...", |api| api.list_routines())?;
        self.console
            .write_line(&format!("Total: {} rotinas\n", routines.len()));

        if routines.is_empty() {
            self.console.write_line("Nenhuma rotina encontrada.");
            return Ok(());
        }
        for (i, routine) in routines.iter().enumerate() {
            self.console
                .write_line(&format!("{}. {}", i + 1, or_missing(&routine.nome)));
            self.console
                .write_line(&format!("   ID: {}", or_missing(&routine.id)));
            self.console
                .write_line(&format!("   Acoes: {}", routine.acoes.len()));
            if let Some(start_time) = &routine.start_time {
                self.console.write_line(&format!("   Inicio: {start_time}"));
            }
            self.console.write_line("");
        }
        Ok(())
    }

    /// Composes a one-action routine: name, then a device picked from the
    /// current list, then the command.
    fn create_routine(&mut self) -> ActionResult {
        self.console.write_line("\n--- Criar Rotina ---");
        let Some(name) = self.require("Nome da rotina", "Nome nao pode ser vazio!")? else {
            return Ok(());
        };

        let devices = self.call("Buscando dispositivos...", |api| api.list_devices())?;
        if devices.is_empty() {
            self.console.error("Nenhum dispositivo disponivel!");
            return Ok(());
        }

        self.console.write_line("\nDispositivos disponiveis:");
        for (i, device) in devices.iter().enumerate() {
            self.console.write_line(&format!(
                "{}. {} ({})",
                i + 1,
                or_missing(&device.nome),
                or_missing(&device.id)
            ));
        }

        let choice = self
            .console
            .read_line("\nEscolha o numero do dispositivo")?;
        let Ok(number) = choice.parse::<usize>() else {
            self.console.error("Numero invalido!");
            return Ok(());
        };
        let Some(device) = number.checked_sub(1).and_then(|idx| devices.get(idx)) else {
            self.console.error("Escolha invalida!");
            return Ok(());
        };
        let Some(device_id) = device.id.clone() else {
            self.console.error("Dispositivo escolhido nao possui ID!");
            return Ok(());
        };

        let Some(command) = self.require("Comando (ligar/desligar)", "Comando nao pode ser vazio!")?
        else {
            return Ok(());
        };

        let start_time = self
            .console
            .read_line("Horario de inicio (AAAA-MM-DDTHH:MM, Enter para nenhum)")?;

        let routine = Routine {
            id: None,
            nome: Some(name),
            acoes: vec![Action::new(device_id, command)],
            start_time: (!start_time.is_empty()).then_some(start_time),
        };

        match self.call("Criando rotina...", |api| api.create_routine(&routine))? {
            Some(created) => {
                self.console.write_line("");
                self.console.success("Rotina criada!");
                self.console
                    .write_line(&format!("  Nome: {}", or_missing(&created.nome)));
                self.console
                    .write_line(&format!("  ID: {}", or_missing(&created.id)));
            }
            None => {
                self.console.write_line("");
                self.console.error("Falha ao criar rotina!");
            }
        }
        Ok(())
    }

    fn list_alerts(&mut self) -> ActionResult {
        self.console.write_line("\n--- Listando Alertas ---");
        let alerts = self.call("Buscando alertas...", |api| api.list_alerts())?;
        self.console
            .write_line(&format!("Total: {} alertas\n", alerts.len()));

        if alerts.is_empty() {
            self.console.write_line("Nenhum alerta encontrado.");
            return Ok(());
        }
        for (i, alert) in alerts.iter().enumerate() {
            self.console
                .write_line(&format!("{}. {}", i + 1, or_missing(&alert.titulo)));
            self.console
                .write_line(&format!("   Mensagem: {}", or_missing(&alert.mensagem)));
            self.console
                .write_line(&format!("   Comodo: {}", or_missing(&alert.comodo)));
            if let Some(timestamp) = &alert.timestamp {
                self.console.write_line(&format!("   Quando: {timestamp}"));
            }
            self.console.write_line("");
        }
        Ok(())
    }

    fn get_room(&mut self) -> ActionResult {
        self.console.write_line("\n--- Obter Comodo ---");
        let Some(name) = self.require("Digite o nome do comodo", "Nome nao pode ser vazio!")? else {
            return Ok(());
        };

        match self.call("Buscando comodo...", |api| api.get_room(&name))? {
            Some(room) => {
                self.console.write_line("\nComodo encontrado:");
                self.console
                    .write_line(&format!("  Nome: {}", or_missing(&room.nome)));
                if room.dispositivos.is_empty() {
                    self.console.write_line("  Nenhum dispositivo neste comodo.");
                } else {
                    self.console
                        .write_line(&format!("  Dispositivos: {}", room.dispositivos.len()));
                    for device in &room.dispositivos {
                        self.console
                            .write_line(&format!("    - {}", or_missing(&device.nome)));
                    }
                }
            }
            None => {
                self.console.write_line("");
                self.console.error("Comodo nao encontrado!");
            }
        }
        Ok(())
    }
}
